mod config;
mod database;

pub use config::{AudioConfig, Config, GrowthConfig, PresetPair, TimerConfig, UiConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/grove[-dev]/` based on GROVE_ENV.
///
/// Set GROVE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("GROVE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("grove-dev")
    } else {
        base_dir.join("grove")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
