//! TOML-based application configuration.
//!
//! Stores:
//! - Weather and Twilio credentials
//! - Scheduler tuning (tick interval, capability timeouts, dedup window)
//! - Canonical fire times for bulk registration
//! - The fallback observation used when the weather lookup fails
//!
//! Configuration is stored at `~/.config/mealtime/config.toml`.

use std::path::PathBuf;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::classify::TimePeriod;
use crate::error::ConfigError;

/// Weather capability configuration (weatherapi.com).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,
}

/// Twilio messaging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub from_number: String,
}

impl TwilioConfig {
    /// All three fields are required to dispatch real SMS.
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }
}

/// Scheduler tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Ticker wake interval in seconds.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Upper bound on any single weather/messaging call.
    #[serde(default = "default_capability_timeout_secs")]
    pub capability_timeout_secs: u64,
    /// Sliding deduplication window in hours.
    #[serde(default = "default_dedup_window_hours")]
    pub dedup_window_hours: i64,
    /// Canonical fire time for bulk morning registration ("HH:MM").
    #[serde(default = "default_morning_at")]
    pub morning_at: String,
    #[serde(default = "default_afternoon_at")]
    pub afternoon_at: String,
    #[serde(default = "default_evening_at")]
    pub evening_at: String,
}

/// Observation substituted when the weather capability fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_temperature")]
    pub temperature_c: f64,
    #[serde(default = "default_fallback_condition")]
    pub condition: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mealtime/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Override for the history log location (defaults to
    /// `<data_dir>/suggestions.csv`).
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

// Default functions
fn default_tick_interval_secs() -> u64 {
    60
}
fn default_capability_timeout_secs() -> u64 {
    10
}
fn default_dedup_window_hours() -> i64 {
    24
}
fn default_morning_at() -> String {
    "08:30".into()
}
fn default_afternoon_at() -> String {
    "13:30".into()
}
fn default_evening_at() -> String {
    "19:30".into()
}
fn default_fallback_temperature() -> f64 {
    25.0
}
fn default_fallback_condition() -> String {
    "Unknown".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            capability_timeout_secs: default_capability_timeout_secs(),
            dedup_window_hours: default_dedup_window_hours(),
            morning_at: default_morning_at(),
            afternoon_at: default_afternoon_at(),
            evening_at: default_evening_at(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            temperature_c: default_fallback_temperature(),
            condition: default_fallback_condition(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            twilio: TwilioConfig::default(),
            scheduler: SchedulerConfig::default(),
            fallback: FallbackConfig::default(),
            history_file: None,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    invalid(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// The canonical (period, fire time) pairs used by bulk registration.
    ///
    /// # Errors
    /// Returns an error if a configured time is not valid `HH:MM`.
    pub fn canonical_times(&self) -> Result<[(TimePeriod, NaiveTime); 3], ConfigError> {
        let parse = |key: &str, s: &str| {
            NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        };
        Ok([
            (
                TimePeriod::Morning,
                parse("scheduler.morning_at", &self.scheduler.morning_at)?,
            ),
            (
                TimePeriod::Afternoon,
                parse("scheduler.afternoon_at", &self.scheduler.afternoon_at)?,
            ),
            (
                TimePeriod::Evening,
                parse("scheduler.evening_at", &self.scheduler.evening_at)?,
            ),
        ])
    }
}
