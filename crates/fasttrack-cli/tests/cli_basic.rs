//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::{
    assert_contains, parse_json, parse_json_stream, run_cli, run_cli_failure, run_cli_success,
    spawn_cli,
};

const T0: &str = "2024-03-01T20:00:00Z";

#[test]
fn status_when_idle() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["status"]);
    assert_contains(&out, "Not fasting");

    let json = parse_json(&run_cli_success(dir.path(), &["status", "--json"]));
    assert_eq!(json["type"], "StateSnapshot");
    assert_eq!(json["state"], "idle");
}

#[test]
fn status_one_second_before_goal() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--goal", "60m", "--at", T0]);

    let json = parse_json(&run_cli_success(
        dir.path(),
        &["status", "--json", "--at", "2024-03-01T20:59:59Z"],
    ));
    assert_eq!(json["state"], "active");
    assert_eq!(json["duration_secs"], 3599);
    assert_eq!(json["goal_met"], false);
    assert_eq!(json["remaining_minutes"], 1);
    let ratio = json["progress_ratio"].as_f64().unwrap();
    assert!(ratio > 0.9997 && ratio < 1.0);

    let json = parse_json(&run_cli_success(
        dir.path(),
        &["status", "--json", "--at", "2024-03-01T21:00:00Z"],
    ));
    assert_eq!(json["goal_met"], true);
    assert_eq!(json["progress_ratio"].as_f64(), Some(1.0));
}

#[test]
fn only_one_fast_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--at", T0]);
    let stderr = run_cli_failure(dir.path(), &["start"]);
    assert_contains(&stderr, "already in progress");
}

#[test]
fn stop_records_duration_and_goal() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--goal", "75m", "--at", T0]);

    let stderr = run_cli_failure(dir.path(), &["stop", "--at", "2024-03-01T19:00:00Z"]);
    assert_contains(&stderr, "Invalid time range");

    let json = parse_json(&run_cli_success(
        dir.path(),
        &["stop", "--json", "--at", "2024-03-01T21:30:00Z"],
    ));
    assert_eq!(json["type"], "FastStopped");
    assert_eq!(json["duration_secs"], 5400);
    assert_eq!(json["goal_met"], true);

    let stderr = run_cli_failure(dir.path(), &["stop"]);
    assert_contains(&stderr, "No fast is in progress");
}

#[test]
fn start_uses_configured_default_goal() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set", "goal.default", "18h"]);
    run_cli_success(dir.path(), &["start", "--at", T0]);

    let json = parse_json(&run_cli_success(dir.path(), &["status", "--json", "--at", T0]));
    assert_eq!(json["goal_minutes"], 1080);
}

#[test]
fn goal_can_be_changed_and_cleared() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_failure(dir.path(), &["goal", "16h"]);

    run_cli_success(dir.path(), &["start", "--goal", "16h", "--at", T0]);
    let json = parse_json(&run_cli_success(dir.path(), &["goal", "none", "--json"]));
    assert_eq!(json["type"], "GoalChanged");
    assert_eq!(json["from"]["minutes"], 960);
    assert_eq!(json["to"], "none");

    let json = parse_json(&run_cli_success(
        dir.path(),
        &["status", "--json", "--at", "2024-03-01T20:30:30Z"],
    ));
    assert!(json["goal_minutes"].is_null());
    assert_eq!(json["goal_met"], false);
    assert_eq!(json["progress_ratio"].as_f64(), Some(0.0));
    assert_eq!(json["duration_secs"], 1830);
}

#[test]
fn rejects_unparsable_goal() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["start", "--goal", "forever"]);
    assert_ne!(code, 0);
}

#[test]
fn history_and_delete_by_prefix() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--goal", "1h", "--at", T0]);
    run_cli_success(dir.path(), &["stop", "--at", "2024-03-01T22:00:00Z"]);
    run_cli_success(dir.path(), &["start", "--at", "2024-03-02T20:00:00Z"]);

    let history = parse_json(&run_cli_success(dir.path(), &["history", "--json"]));
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["state"], "active");
    assert_eq!(entries[1]["state"], "completed");
    assert_eq!(entries[1]["goal_met"], true);

    let limited = parse_json(&run_cli_success(dir.path(), &["history", "--json", "-n", "1"]));
    assert_eq!(limited.as_array().unwrap().len(), 1);
    run_cli_failure(dir.path(), &["history", "-n", "0"]);

    let text = run_cli_success(dir.path(), &["history"]);
    assert_contains(&text, "met");
    assert_contains(&text, "(active)");

    let old_id = entries[1]["session_id"].as_str().unwrap().to_string();
    let out = run_cli_success(dir.path(), &["delete", &old_id[..8]]);
    assert_contains(&out, &old_id);

    let history = parse_json(&run_cli_success(dir.path(), &["history", "--json"]));
    assert_eq!(history.as_array().unwrap().len(), 1);

    run_cli_failure(dir.path(), &["delete", "does-not-exist"]);
}

#[test]
fn stats_json() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--goal", "1h", "--at", T0]);
    run_cli_success(dir.path(), &["stop", "--at", "2024-03-01T21:30:00Z"]);

    let stats = parse_json(&run_cli_success(dir.path(), &["stats", "--json"]));
    assert_eq!(stats["total_fasts"], 1);
    assert_eq!(stats["goals_met"], 1);
    assert_eq!(stats["longest_secs"], 5400);
    assert_eq!(stats["current_streak"], 1);
    assert!(stats["in_progress"].is_null());
}

#[test]
fn config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_cli_success(dir.path(), &["config", "get", "goal.default"]).trim(), "16h");

    run_cli_success(dir.path(), &["config", "set", "display.refresh_secs", "5"]);
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "display.refresh_secs"]).trim(),
        "5"
    );

    run_cli_failure(dir.path(), &["config", "set", "display.nope", "1"]);
    run_cli_failure(dir.path(), &["config", "set", "goal.default", "soon"]);
    run_cli_failure(dir.path(), &["config", "get", "display.nope"]);

    run_cli_success(dir.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(dir.path(), &["config", "get", "display.refresh_secs"]).trim(),
        "1"
    );
}

#[test]
fn watch_when_idle_returns() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli_success(dir.path(), &["watch"]);
    assert_contains(&out, "Not fasting");
}

#[test]
fn watch_until_goal_exits_when_goal_already_met() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--goal", "1m", "--at", T0]);

    let out = run_cli_success(dir.path(), &["watch", "--until-goal", "--json"]);
    let docs = parse_json_stream(&out);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["type"], "StateSnapshot");
    assert_eq!(docs[1]["type"], "GoalReached");
}

#[test]
fn watch_ends_when_fast_is_stopped_elsewhere() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--goal", "16h"]);

    let mut child = spawn_cli(dir.path(), &["watch", "--json"]);
    thread::sleep(Duration::from_millis(1500));
    run_cli_success(dir.path(), &["stop"]);

    let deadline = Instant::now() + Duration::from_secs(10);
    while child.try_wait().unwrap().is_none() {
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("watch kept running after the fast was stopped");
        }
        thread::sleep(Duration::from_millis(100));
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let docs = parse_json_stream(&String::from_utf8_lossy(&output.stdout));
    let last = docs.last().unwrap();
    assert_eq!(last["type"], "StateSnapshot");
    assert_eq!(last["state"], "completed");
    assert!(docs[..docs.len() - 1].iter().all(|d| d["state"] == "active"));
}

#[test]
fn watch_until_goal_requires_a_goal() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["start", "--goal", "none", "--at", T0]);
    let stderr = run_cli_failure(dir.path(), &["watch", "--until-goal"]);
    assert_contains(&stderr, "--until-goal");
}

#[test]
fn presets_drive_start_and_goal() {
    let dir = tempfile::tempdir().unwrap();
    let presets = parse_json(&run_cli_success(dir.path(), &["presets", "--json"]));
    let presets = presets.as_array().unwrap();
    assert_eq!(presets.len(), 6);
    assert_eq!(presets[0]["number"], 1);
    assert_eq!(presets[0]["goal"]["minutes"], 720);
    assert_contains(&run_cli_success(dir.path(), &["presets"]), "3. 16h 00m");

    run_cli_success(dir.path(), &["start", "--preset", "3", "--at", T0]);
    let json = parse_json(&run_cli_success(dir.path(), &["status", "--json", "--at", T0]));
    assert_eq!(json["goal_minutes"], 960);

    let json = parse_json(&run_cli_success(dir.path(), &["goal", "--preset", "6", "--json"]));
    assert_eq!(json["to"]["minutes"], 1440);

    let stderr = run_cli_failure(dir.path(), &["goal", "--preset", "7"]);
    assert_contains(&stderr, "goal.presets");
    run_cli_failure(dir.path(), &["goal"]);
    run_cli_failure(dir.path(), &["goal", "16h", "--preset", "1"]);

    run_cli_success(dir.path(), &["config", "set", "goal.presets", "[90]"]);
    run_cli_success(dir.path(), &["goal", "--preset", "1"]);
    let json = parse_json(&run_cli_success(dir.path(), &["status", "--json", "--at", T0]));
    assert_eq!(json["goal_minutes"], 90);
}
