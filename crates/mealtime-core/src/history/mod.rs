//! Suggestion history: the append-only record of everything ever sent.
//!
//! The history is the single source of durable truth -- deduplication and
//! schedule recovery are both derived from it, so there is no separate
//! schedule-state file. Records are immutable once appended.

use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::catalog::FoodCategory;
use crate::classify::{TempBand, TimePeriod};
use crate::error::HistoryError;

/// Wire format for timestamps in the durable log and outbound messages.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One delivered suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub name: String,
    pub phone: String,
    pub location: String,
    /// Weather condition text at send time.
    pub weather: String,
    pub temperature: f64,
    pub band: TempBand,
    /// The suggested label, exactly as shown in the catalog.
    pub food: String,
    pub category: FoodCategory,
    /// Local wall-clock send time, second precision.
    pub sent_at: NaiveDateTime,
    pub period: TimePeriod,
}

impl SuggestionRecord {
    pub fn matches_user(&self, name: &str, phone: &str) -> bool {
        self.name == name && self.phone == phone
    }

    /// The stored period must agree with the one derived from the
    /// timestamp hour.
    pub fn period_is_consistent(&self) -> bool {
        use chrono::Timelike;
        self.period == TimePeriod::from_hour(self.sent_at.hour())
    }
}

/// Durable append-only store of suggestion records.
///
/// `append` must reach durable storage before returning and appends are
/// serialized by the implementation (single-writer discipline). `read_all`
/// is a full scan; damaged rows are skipped, never an error.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: &SuggestionRecord) -> Result<(), HistoryError>;
    fn read_all(&self) -> Result<Vec<SuggestionRecord>, HistoryError>;
}

// ── Derived queries ──────────────────────────────────────────────────

/// Labels sent to (name, phone) for `period` within the sliding `window`
/// ending at `now`. This is the selector's exclusion set.
pub fn recent_labels(
    records: &[SuggestionRecord],
    name: &str,
    phone: &str,
    period: TimePeriod,
    now: NaiveDateTime,
    window: Duration,
) -> HashSet<String> {
    let cutoff = now - window;
    records
        .iter()
        .filter(|r| r.matches_user(name, phone))
        .filter(|r| r.period == period)
        .filter(|r| r.sent_at >= cutoff && r.sent_at <= now)
        .map(|r| r.food.clone())
        .collect()
}

/// Whether any record exists for this user. Drives the one-time category
/// preference prompt on the interactive path.
pub fn user_exists(records: &[SuggestionRecord], name: &str, phone: &str) -> bool {
    records.iter().any(|r| r.matches_user(name, phone))
}

/// Distinct periods a user has received suggestions in.
pub fn periods_for(
    records: &[SuggestionRecord],
    name: &str,
    phone: &str,
) -> BTreeSet<TimePeriod> {
    records
        .iter()
        .filter(|r| r.matches_user(name, phone))
        .map(|r| r.period)
        .collect()
}
