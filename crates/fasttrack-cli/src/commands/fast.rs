use chrono::{DateTime, Utc};
use fasttrack_core::{Config, ConfigError, Database, Event, FastingSnapshot, Goal};
use serde::Serialize;

use super::{format_secs, print_json};

/// Explicit goal, else preset number, else `fallback` from the config.
fn resolve_goal(
    goal: Option<Goal>,
    preset: Option<usize>,
    fallback: impl FnOnce(&Config) -> Result<Goal, ConfigError>,
) -> Result<Goal, Box<dyn std::error::Error>> {
    if let Some(goal) = goal {
        return Ok(goal);
    }
    let config = Config::load()?;
    Ok(match preset {
        Some(number) => config.preset(number)?,
        None => fallback(&config)?,
    })
}

pub fn start(
    goal: Option<Goal>,
    preset: Option<usize>,
    at: Option<DateTime<Utc>>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let goal = resolve_goal(goal, preset, Config::default_goal)?;
    let now = Utc::now();
    let db = Database::open()?;
    let session = db.start_fast(at.unwrap_or(now), goal)?;

    if json {
        print_json(&Event::FastStarted {
            session_id: session.id.clone(),
            goal: session.goal,
            at: now,
        })?;
    } else {
        println!("Fast started ({})", session.id);
        match session.progress_at(now).projected_end_time {
            Some(end) => println!("Goal: {} (until {})", session.goal, end.format("%Y-%m-%d %H:%M UTC")),
            None => println!("Goal: none"),
        }
    }
    Ok(())
}

pub fn stop(at: Option<DateTime<Utc>>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let db = Database::open()?;
    let session = db.stop_fast(at.unwrap_or(now))?;
    let progress = session.progress_at(now);

    if json {
        print_json(&Event::FastStopped {
            session_id: session.id.clone(),
            duration_secs: progress.duration_secs,
            goal_met: progress.goal_met,
            at: now,
        })?;
    } else {
        let verdict = match session.goal {
            Goal::None => String::new(),
            Goal::Minutes(_) if progress.goal_met => " - goal reached".to_string(),
            Goal::Minutes(_) => format!(" - {} short of goal", progress.remaining_hours_and_minutes()),
        };
        println!("Fast stopped after {}{verdict}", format_secs(progress.duration_secs));
    }
    Ok(())
}

pub fn status(at: Option<DateTime<Utc>>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let now = at.unwrap_or_else(Utc::now);
    let db = Database::open()?;
    let active = db.active_session()?;
    let snapshot = FastingSnapshot::of(active.as_ref(), now);

    if json {
        print_json(&Event::StateSnapshot(snapshot))?;
    } else {
        let show_seconds = Config::load_or_default().display.show_seconds;
        println!("{}", snapshot.summary_opts(show_seconds));
    }
    Ok(())
}

pub fn set_goal(
    goal: Option<Goal>,
    preset: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // clap requires one of the two; a missing goal means "no goal".
    let goal = resolve_goal(goal, preset, |_| Ok(Goal::None))?;
    let now = Utc::now();
    let db = Database::open()?;
    let (session, previous) = db.set_goal(goal)?;

    if json {
        print_json(&Event::GoalChanged {
            session_id: session.id.clone(),
            from: previous,
            to: session.goal,
            at: now,
        })?;
    } else {
        println!("Goal changed: {previous} -> {}", session.goal);
        println!("{}", FastingSnapshot::capture(&session, now).summary());
    }
    Ok(())
}

#[derive(Serialize)]
struct PresetEntry {
    number: usize,
    goal: Goal,
    label: String,
}

pub fn presets(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let entries: Vec<PresetEntry> = config
        .preset_goals()
        .into_iter()
        .enumerate()
        .map(|(i, goal)| PresetEntry {
            number: i + 1,
            goal,
            label: goal.to_string(),
        })
        .collect();

    if json {
        print_json(&entries)?;
    } else if entries.is_empty() {
        println!("No presets configured (goal.presets)");
    } else {
        for entry in &entries {
            println!("{:>2}. {}", entry.number, entry.label);
        }
    }
    Ok(())
}
