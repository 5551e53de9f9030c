pub mod config;
pub mod fast;
pub mod history;
pub mod stats;
pub mod watch;

/// Print a serializable value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render whole seconds as `1h 05m`.
pub fn format_secs(secs: u64) -> String {
    fasttrack_core::HoursMinutes::from_minutes(secs / 60).to_string()
}
