//! Recurring suggestion scheduler.
//!
//! One job per (user, period), firing daily at a fixed clock time. The job
//! table is a mutex-guarded map keyed by [`JobKey`] plus a min-heap of
//! (next fire time, key) pairs polled by a single cooperative ticker;
//! replaced or cancelled jobs leave stale heap entries behind that are
//! discarded on pop.
//!
//! ## State Transitions
//!
//! ```text
//! Pending -> Firing -> Pending (re-armed for the same clock time tomorrow)
//! ```
//!
//! Re-arming happens on success *and* on failure -- a failed delivery never
//! stops the daily cadence. There is no terminal state in normal operation;
//! a job lives until explicit cancellation.

pub mod recovery;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::capabilities::{Messenger, Observation, Popup, Weather};
use crate::catalog::{Catalog, FoodCategory};
use crate::classify::{TempBand, TimePeriod};
use crate::error::{CatalogError, ConfigError, CoreError, HistoryError};
use crate::history::{self, HistoryStore, SuggestionRecord};
use crate::selector;
use crate::storage::Config;

/// Composite key: one job per (user identity, time-of-day period).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub name: String,
    pub phone: String,
    pub period: TimePeriod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Armed, waiting for the fire time.
    Pending,
    /// Executing selection and dispatch; cannot re-fire until re-armed.
    Firing,
}

/// A recurring daily commitment to deliver one suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub key: JobKey,
    pub location: String,
    /// Fixed daily fire time (hour:minute).
    pub fire_at: NaiveTime,
    /// Optional category preference captured at registration.
    pub category: Option<FoodCategory>,
    pub next_fire: NaiveDateTime,
    pub state: JobState,
}

impl ScheduledJob {
    /// Job armed for the next occurrence of `fire_at`: later today if the
    /// time is still ahead, otherwise tomorrow.
    pub fn new(
        key: JobKey,
        location: &str,
        fire_at: NaiveTime,
        category: Option<FoodCategory>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            key,
            location: location.to_string(),
            fire_at,
            category,
            next_fire: next_occurrence(now, fire_at),
            state: JobState::Pending,
        }
    }

    /// Job armed for tomorrow at `fire_at`, regardless of the current time.
    /// Recovery uses this: the historical send already covered today.
    pub fn armed_for_tomorrow(
        key: JobKey,
        location: &str,
        fire_at: NaiveTime,
        category: Option<FoodCategory>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            key,
            location: location.to_string(),
            fire_at,
            category,
            next_fire: tomorrow_at(now, fire_at),
            state: JobState::Pending,
        }
    }

    /// Stable identifier derived from (name, contact, fire time).
    pub fn job_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.key.name,
            self.key.phone,
            self.fire_at.format("%H:%M")
        )
    }
}

/// Next occurrence of `fire_at` strictly after `now`.
pub fn next_occurrence(now: NaiveDateTime, fire_at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(fire_at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Tomorrow at `fire_at`.
pub fn tomorrow_at(now: NaiveDateTime, fire_at: NaiveTime) -> NaiveDateTime {
    now.date().and_time(fire_at) + Duration::days(1)
}

#[derive(Default)]
struct TableInner {
    jobs: HashMap<JobKey, ScheduledJob>,
    /// Min-heap of (next fire, key). Entries go stale when a job is
    /// replaced or cancelled; `due` discards them on pop.
    queue: BinaryHeap<Reverse<(NaiveDateTime, JobKey)>>,
}

/// The in-memory job table: the only shared mutable state besides the
/// history appender.
#[derive(Default)]
pub struct JobTable {
    inner: Mutex<TableInner>,
}

impl JobTable {
    fn lock(&self) -> std::sync::MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace. Registering the same key again replaces the job
    /// (idempotent scheduling); the most recent registration wins.
    pub fn insert(&self, job: ScheduledJob) {
        let mut inner = self.lock();
        inner
            .queue
            .push(Reverse((job.next_fire, job.key.clone())));
        inner.jobs.insert(job.key.clone(), job);
    }

    /// Remove a job. Returns false if no job existed for the key.
    pub fn cancel(&self, key: &JobKey) -> bool {
        self.lock().jobs.remove(key).is_some()
    }

    pub fn get(&self, key: &JobKey) -> Option<ScheduledJob> {
        self.lock().jobs.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().jobs.is_empty()
    }

    /// All jobs, ordered by key.
    pub fn snapshot(&self) -> Vec<ScheduledJob> {
        let inner = self.lock();
        let mut jobs: Vec<ScheduledJob> = inner.jobs.values().cloned().collect();
        jobs.sort_by(|a, b| a.key.cmp(&b.key));
        jobs
    }

    /// Pop every job due at `now`, marking each `Firing` so it cannot
    /// re-fire before it is re-armed. Stale heap entries are discarded.
    pub fn due(&self, now: NaiveDateTime) -> Vec<JobKey> {
        let mut inner = self.lock();
        let mut due = Vec::new();
        while let Some(Reverse((at, _))) = inner.queue.peek() {
            if *at > now {
                break;
            }
            let Some(Reverse((at, key))) = inner.queue.pop() else {
                break;
            };
            match inner.jobs.get_mut(&key) {
                Some(job) if job.next_fire == at && job.state == JobState::Pending => {
                    job.state = JobState::Firing;
                    due.push(key);
                }
                _ => {} // stale: replaced, cancelled, or already firing
            }
        }
        due
    }

    /// Return a job to `Pending` with a fresh fire time.
    pub fn rearm(&self, key: &JobKey, next_fire: NaiveDateTime) {
        let mut inner = self.lock();
        if let Some(job) = inner.jobs.get_mut(key) {
            job.state = JobState::Pending;
            job.next_fire = next_fire;
            inner.queue.push(Reverse((next_fire, key.clone())));
        }
    }
}

/// Scheduler tuning, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Ticker wake interval.
    pub tick_interval: StdDuration,
    /// Upper bound on any single weather/messaging/popup call.
    pub capability_timeout: StdDuration,
    /// Sliding deduplication window.
    pub dedup_window: Duration,
    /// Observation substituted when the weather lookup fails.
    pub fallback: Observation,
    /// Canonical fire times for bulk registration.
    pub canonical_times: [(TimePeriod, NaiveTime); 3],
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval: StdDuration::from_secs(60),
            capability_timeout: StdDuration::from_secs(10),
            dedup_window: Duration::hours(24),
            fallback: Observation {
                temperature_c: 25.0,
                condition: "Unknown".to_string(),
            },
            canonical_times: [
                (
                    TimePeriod::Morning,
                    NaiveTime::from_hms_opt(8, 30, 0).unwrap_or_default(),
                ),
                (
                    TimePeriod::Afternoon,
                    NaiveTime::from_hms_opt(13, 30, 0).unwrap_or_default(),
                ),
                (
                    TimePeriod::Evening,
                    NaiveTime::from_hms_opt(19, 30, 0).unwrap_or_default(),
                ),
            ],
        }
    }
}

impl SchedulerSettings {
    /// Resolve settings from the persisted configuration.
    ///
    /// # Errors
    /// Returns an error if a canonical time string is not valid `HH:MM`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            tick_interval: StdDuration::from_secs(config.scheduler.tick_interval_secs),
            capability_timeout: StdDuration::from_secs(config.scheduler.capability_timeout_secs),
            dedup_window: Duration::hours(config.scheduler.dedup_window_hours),
            fallback: Observation {
                temperature_c: config.fallback.temperature_c,
                condition: config.fallback.condition.clone(),
            },
            canonical_times: config.canonical_times()?,
        })
    }
}

/// Outcome of one firing. Dispatch flags are best-effort results, not
/// delivery receipts.
#[derive(Debug, Clone, Serialize)]
pub struct FiringReport {
    pub record: SuggestionRecord,
    /// The outbound SMS body.
    pub message: String,
    pub sms_delivered: bool,
    pub popup_shown: bool,
}

/// The recurring suggestion engine.
pub struct Scheduler {
    catalog: Catalog,
    table: JobTable,
    history: Arc<dyn HistoryStore>,
    weather: Arc<dyn Weather>,
    messenger: Arc<dyn Messenger>,
    popup: Arc<dyn Popup>,
    settings: SchedulerSettings,
}

impl Scheduler {
    /// Build a scheduler, validating catalog completeness up front.
    ///
    /// # Errors
    /// Returns an error if any (band, period) catalog cell is empty --
    /// a programming-time invariant, fatal at startup.
    pub fn new(
        catalog: Catalog,
        history: Arc<dyn HistoryStore>,
        weather: Arc<dyn Weather>,
        messenger: Arc<dyn Messenger>,
        popup: Arc<dyn Popup>,
        settings: SchedulerSettings,
    ) -> Result<Self, CatalogError> {
        catalog.validate()?;
        Ok(Self {
            catalog,
            table: JobTable::default(),
            history,
            weather,
            messenger,
            popup,
            settings,
        })
    }

    pub fn table(&self) -> &JobTable {
        &self.table
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Interactive entry point: arm one job for the period matching the
    /// current clock time, firing tomorrow at this hour:minute.
    pub fn register(
        &self,
        name: &str,
        phone: &str,
        location: &str,
        category: Option<FoodCategory>,
        now: NaiveDateTime,
    ) -> JobKey {
        let key = JobKey {
            name: name.to_string(),
            phone: phone.to_string(),
            period: TimePeriod::from_hour(now.hour()),
        };
        let fire_at =
            NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_default();
        self.table.insert(ScheduledJob::armed_for_tomorrow(
            key.clone(),
            location,
            fire_at,
            category,
            now,
        ));
        key
    }

    /// Bulk entry point: arm exactly one job per period at the canonical
    /// times.
    pub fn register_all(
        &self,
        name: &str,
        phone: &str,
        location: &str,
        category: Option<FoodCategory>,
        now: NaiveDateTime,
    ) -> Vec<JobKey> {
        self.settings
            .canonical_times
            .iter()
            .map(|&(period, fire_at)| {
                let key = JobKey {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    period,
                };
                self.table.insert(ScheduledJob::new(
                    key.clone(),
                    location,
                    fire_at,
                    category,
                    now,
                ));
                key
            })
            .collect()
    }

    /// Tear down one job. Returns false if no job existed for the key.
    pub fn cancel(&self, key: &JobKey) -> bool {
        self.table.cancel(key)
    }

    /// Rebuild the job table from the suggestion history.
    ///
    /// # Errors
    /// Returns an error if the history log cannot be read at all;
    /// row-level damage is skipped by the store.
    pub fn recover(&self, now: NaiveDateTime) -> Result<usize, HistoryError> {
        let records = self.history.read_all()?;
        let jobs = recovery::recover_jobs(&records, now);
        let count = jobs.len();
        for job in jobs {
            self.table.insert(job);
        }
        Ok(count)
    }

    // ── Firing ───────────────────────────────────────────────────────

    /// Interactive immediate suggestion for the current period, plus a job
    /// armed for tomorrow at this clock time.
    pub async fn suggest_now(
        &self,
        name: &str,
        phone: &str,
        location: &str,
        category: Option<FoodCategory>,
        now: NaiveDateTime,
    ) -> Result<FiringReport, CoreError> {
        let period = TimePeriod::from_hour(now.hour());
        let report = self
            .deliver(name, phone, location, period, category, now)
            .await?;
        self.register(name, phone, location, category, now);
        Ok(report)
    }

    /// Fire one due job, then re-arm it for the same clock time tomorrow.
    /// Re-arming happens regardless of the delivery outcome.
    pub async fn fire(&self, key: &JobKey, now: NaiveDateTime) -> Option<FiringReport> {
        let job = self.table.get(key)?;
        // The period comes from the clock at fire time, not the job key, so
        // the stored record always agrees with its own timestamp.
        let result = self
            .deliver(
                &key.name,
                &key.phone,
                &job.location,
                TimePeriod::from_hour(now.hour()),
                job.category,
                now,
            )
            .await;
        self.table.rearm(key, tomorrow_at(now, job.fire_at));
        match result {
            Ok(report) => Some(report),
            Err(err) => {
                eprintln!("Warning: firing failed for {}: {err}", job.job_id());
                None
            }
        }
    }

    /// The cooperative ticker: wakes every `tick_interval`, fires each due
    /// job on its own task so one slow network call cannot delay the
    /// others. Runs until the surrounding runtime shuts down.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.settings.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let now = Local::now().naive_local();
            for key in self.table.due(now) {
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move {
                    let _ = scheduler.fire(&key, Local::now().naive_local()).await;
                });
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Current conditions, or the configured fallback. Never fails.
    async fn observe(&self, location: &str) -> Observation {
        let lookup = self.weather.lookup(location);
        match tokio::time::timeout(self.settings.capability_timeout, lookup).await {
            Ok(Ok(observation)) => observation,
            Ok(Err(err)) => {
                eprintln!("Warning: weather lookup failed for {location}: {err}");
                self.settings.fallback.clone()
            }
            Err(_) => {
                eprintln!("Warning: weather lookup timed out for {location}");
                self.settings.fallback.clone()
            }
        }
    }

    /// The full selection + persist + dispatch pipeline for one (user,
    /// period). Dispatch failures are logged and reported, never raised;
    /// only a failed history append aborts (the record must be durable
    /// before anything goes out).
    async fn deliver(
        &self,
        name: &str,
        phone: &str,
        location: &str,
        period: TimePeriod,
        category: Option<FoodCategory>,
        now: NaiveDateTime,
    ) -> Result<FiringReport, CoreError> {
        let observation = self.observe(location).await;
        let band = TempBand::from_celsius(observation.temperature_c);

        let records = match self.history.read_all() {
            Ok(records) => records,
            Err(err) => {
                // Favor availability: fire without deduplication rather
                // than skip the delivery.
                eprintln!("Warning: could not read history for dedup: {err}");
                Vec::new()
            }
        };
        let excluded = history::recent_labels(
            &records,
            name,
            phone,
            period,
            now,
            self.settings.dedup_window,
        );

        let entry = selector::select(
            &self.catalog,
            band,
            period,
            &excluded,
            category,
            &mut rand::thread_rng(),
        )
        .ok_or(CatalogError::EmptyCell { band, period })?;

        let record = SuggestionRecord {
            name: name.to_string(),
            phone: phone.to_string(),
            location: location.to_string(),
            weather: observation.condition.clone(),
            temperature: observation.temperature_c,
            band,
            food: entry.label.clone(),
            category: entry.category,
            sent_at: now,
            period,
        };
        self.history.append(&record)?;

        let message = sms_body(&record);
        let sms_delivered = match tokio::time::timeout(
            self.settings.capability_timeout,
            self.messenger.send(phone, &message),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                eprintln!("Warning: failed to send SMS to {phone}: {err}");
                false
            }
            Err(_) => {
                eprintln!("Warning: SMS send to {phone} timed out");
                false
            }
        };

        let (title, body) = popup_content(&record);
        let popup_shown = match tokio::time::timeout(
            self.settings.capability_timeout,
            self.popup.show(&title, &body),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                eprintln!("Warning: popup failed: {err}");
                false
            }
            Err(_) => {
                eprintln!("Warning: popup timed out");
                false
            }
        };

        Ok(FiringReport {
            record,
            message,
            sms_delivered,
            popup_shown,
        })
    }
}

// ── Message formatting ───────────────────────────────────────────────

fn format_send_time(at: NaiveDateTime) -> String {
    at.format("%I:%M %p on %b %d, %Y").to_string()
}

fn sms_body(record: &SuggestionRecord) -> String {
    format!(
        "{}, {}! Here's your {} food suggestion for {}°C in {}: {} (sent at {})",
        record.period.greeting(),
        record.name,
        record.period,
        record.temperature,
        record.location,
        record.food,
        format_send_time(record.sent_at),
    )
}

fn popup_content(record: &SuggestionRecord) -> (String, String) {
    (
        format!("{} Food Suggestion", record.period.title()),
        format!(
            "{} is perfect for {}°C in {}.",
            record.food, record.temperature, record.location
        ),
    )
}
