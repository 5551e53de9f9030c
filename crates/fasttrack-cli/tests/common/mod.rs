//! Common utilities for CLI E2E tests.

use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Invoke the CLI against an isolated data directory and return (stdout, stderr, code).
pub fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_fasttrack"))
        .args(args)
        .env("FASTTRACK_DATA_DIR", data_dir)
        .env_remove("FASTTRACK_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Start the CLI in the background with stdout captured.
pub fn spawn_cli(data_dir: &Path, args: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_fasttrack"))
        .args(args)
        .env("FASTTRACK_DATA_DIR", data_dir)
        .env_remove("FASTTRACK_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI command")
}

/// Invoke a CLI command and expect success.
pub fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed with code {code}: {args:?}\n{stderr}");
    stdout
}

/// Invoke a CLI command and expect failure; returns stderr.
pub fn run_cli_failure(data_dir: &Path, args: &[&str]) -> String {
    let (_stdout, stderr, code) = run_cli(data_dir, args);
    assert!(code != 0, "CLI command unexpectedly succeeded: {args:?}");
    stderr
}

/// Parse JSON output from CLI.
pub fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Parse a stream of pretty-printed JSON documents.
pub fn parse_json_stream(out: &str) -> Vec<serde_json::Value> {
    serde_json::Deserializer::from_str(out)
        .into_iter::<serde_json::Value>()
        .collect::<Result<_, _>>()
        .expect("Failed to parse JSON stream")
}

/// Check if string contains substring
pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected '{haystack}' to contain '{needle}'"
    );
}
