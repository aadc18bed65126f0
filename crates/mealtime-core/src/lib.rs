//! # Mealtime Core Library
//!
//! This library provides the core business logic for Mealtime, a recurring
//! weather-aware food-suggestion service. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI
//! binary over the same core library.
//!
//! ## Architecture
//!
//! - **Classification**: pure temperature-band and time-of-day mapping
//! - **Catalog**: static (band, period) suggestion table, validated at
//!   startup
//! - **Selector**: deduplicating random choice with fallback tiers
//! - **History**: append-only CSV log; the single durable source of truth
//!   for both deduplication and schedule recovery
//! - **Scheduler**: one job per (user, period), fired daily by a single
//!   cooperative ticker, re-armed for the same clock time tomorrow
//! - **Capabilities**: weather, SMS and popup adapters behind async traits
//!
//! ## Key Components
//!
//! - [`Scheduler`]: the recurring suggestion engine
//! - [`Catalog`]: suggestion content and completeness validation
//! - [`CsvHistory`]: durable history storage
//! - [`Config`]: application configuration management

pub mod capabilities;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod history;
pub mod scheduler;
pub mod selector;
pub mod storage;

pub use capabilities::{
    ConsoleMessenger, ConsolePopup, DesktopPopup, Messenger, Observation, Popup, TwilioMessenger,
    Weather, WeatherApi,
};
pub use catalog::{Catalog, CatalogEntry, FoodCategory};
pub use classify::{TempBand, TimePeriod};
pub use error::{
    CatalogError, ConfigError, CoreError, HistoryError, SendError, ValidationError, WeatherError,
};
pub use history::{HistoryStore, SuggestionRecord, TIMESTAMP_FORMAT};
pub use scheduler::{
    FiringReport, JobKey, JobState, JobTable, ScheduledJob, Scheduler, SchedulerSettings,
};
pub use storage::{Config, CsvHistory};
