mod config;
pub mod history_log;

pub use config::{Config, FallbackConfig, SchedulerConfig, TwilioConfig, WeatherConfig};
pub use history_log::CsvHistory;

use std::path::PathBuf;

/// Returns `~/.config/mealtime[-dev]/` based on MEALTIME_ENV.
///
/// Set MEALTIME_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MEALTIME_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("mealtime-dev")
    } else {
        base_dir.join("mealtime")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default location of the suggestion history log.
pub fn default_history_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join("suggestions.csv"))
}
