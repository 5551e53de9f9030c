mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DisplayConfig, GoalConfig};
pub use database::{Database, Stats};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `FASTTRACK_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/fasttrack[-dev]/`, with the `-dev` suffix when
/// `FASTTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FASTTRACK_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FASTTRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("fasttrack-dev")
            } else {
                base_dir.join("fasttrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
