//! Core error types for mealtime-core.
//!
//! One enum per concern, aggregated into [`CoreError`]. Capability failures
//! (weather, messaging) are deliberately kept out of `CoreError`: they are
//! transient by taxonomy, matched at the call site, and never propagate out
//! of a firing.

use std::path::PathBuf;

use thiserror::Error;

use crate::classify::{TempBand, TimePeriod};

/// Core error type for mealtime-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// History log errors
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog invariant violations
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// History-log-specific errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Failed to open or create the log file
    #[error("Failed to open history log at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Append did not reach durable storage
    #[error("Failed to append history record: {0}")]
    AppendFailed(String),

    /// Read failed below the row level (row-level damage is skipped, not
    /// reported here)
    #[error("Failed to read history log: {0}")]
    ReadFailed(String),
}

impl From<csv::Error> for HistoryError {
    fn from(err: csv::Error) -> Self {
        HistoryError::ReadFailed(err.to_string())
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Catalog invariant violations. Fatal at startup validation, never a
/// runtime branch.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A (band, period) cell has no entries
    #[error("Catalog cell ({band}, {period}) is empty")]
    EmptyCell { band: TempBand, period: TimePeriod },
}

/// Transient weather capability failure. Callers substitute a default
/// observation; this never crosses a firing boundary.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Weather service unavailable: {0}")]
    Unavailable(String),

    #[error("Weather response malformed: {0}")]
    Malformed(String),

    #[error("Weather lookup timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Unavailable(err.to_string())
    }
}

/// Transient outbound dispatch failure (SMS or popup). Logged, not retried,
/// not escalated.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("Delivery failed: {0}")]
    Failed(String),

    #[error("Delivery rejected: HTTP {status}")]
    Rejected { status: u16 },

    #[error("Delivery timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Channel not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        SendError::Failed(err.to_string())
    }
}

/// Input validation errors (CLI and registration paths).
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Unknown food category: {0}")]
    UnknownCategory(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
