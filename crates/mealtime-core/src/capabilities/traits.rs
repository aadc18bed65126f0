use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{SendError, WeatherError};

/// A current-conditions reading for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub temperature_c: f64,
    pub condition: String,
}

/// Current-weather lookup. Fails with a transient error on network
/// trouble; callers substitute a configured default and never propagate
/// the failure upward.
#[async_trait]
pub trait Weather: Send + Sync {
    async fn lookup(&self, location: &str) -> Result<Observation, WeatherError>;
}

/// Outbound text-message channel. Failures are logged by the caller, not
/// retried, not escalated.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError>;
}

/// Desktop popup channel. Best-effort; the caller ignores failures beyond
/// logging them.
#[async_trait]
pub trait Popup: Send + Sync {
    async fn show(&self, title: &str, body: &str) -> Result<(), SendError>;
}
