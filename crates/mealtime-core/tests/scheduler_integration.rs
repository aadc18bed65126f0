//! Integration tests for the scheduler firing pipeline.
//!
//! Capabilities are replaced with recording mocks so every dispatch
//! attempt and failure path is observable.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};

use mealtime_core::error::{HistoryError, SendError, WeatherError};
use mealtime_core::{
    Catalog, HistoryStore, JobState, Messenger, Observation, Popup, Scheduler, SchedulerSettings,
    SuggestionRecord, TempBand, TimePeriod, Weather, TIMESTAMP_FORMAT,
};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
}

// ── Mock capabilities ────────────────────────────────────────────────

struct StaticWeather {
    observation: Option<Observation>,
}

impl StaticWeather {
    fn sunny(temperature_c: f64) -> Self {
        Self {
            observation: Some(Observation {
                temperature_c,
                condition: "Sunny".to_string(),
            }),
        }
    }

    fn failing() -> Self {
        Self { observation: None }
    }
}

#[async_trait]
impl Weather for StaticWeather {
    async fn lookup(&self, _location: &str) -> Result<Observation, WeatherError> {
        self.observation
            .clone()
            .ok_or_else(|| WeatherError::Unavailable("connection refused".to_string()))
    }
}

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        if self.fail {
            Err(SendError::Rejected { status: 500 })
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct RecordingPopup {
    shown: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Popup for RecordingPopup {
    async fn show(&self, title: &str, body: &str) -> Result<(), SendError> {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct MemoryHistory {
    records: Mutex<Vec<SuggestionRecord>>,
    fail_appends: bool,
}

impl HistoryStore for MemoryHistory {
    fn append(&self, record: &SuggestionRecord) -> Result<(), HistoryError> {
        if self.fail_appends {
            return Err(HistoryError::AppendFailed("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<SuggestionRecord>, HistoryError> {
        Ok(self.records.lock().unwrap().clone())
    }
}

struct Harness {
    scheduler: Scheduler,
    messenger: Arc<RecordingMessenger>,
    popup: Arc<RecordingPopup>,
    history: Arc<MemoryHistory>,
}

fn harness(weather: StaticWeather, messenger: RecordingMessenger, history: MemoryHistory) -> Harness {
    let messenger = Arc::new(messenger);
    let popup = Arc::new(RecordingPopup::default());
    let history = Arc::new(history);
    let scheduler = Scheduler::new(
        Catalog::builtin(),
        Arc::clone(&history) as Arc<dyn HistoryStore>,
        Arc::new(weather),
        Arc::clone(&messenger) as Arc<dyn Messenger>,
        Arc::clone(&popup) as Arc<dyn Popup>,
        SchedulerSettings::default(),
    )
    .unwrap();
    Harness {
        scheduler,
        messenger,
        popup,
        history,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_hot_evening_first_suggestion() {
    let h = harness(
        StaticWeather::sunny(36.0),
        RecordingMessenger::default(),
        MemoryHistory::default(),
    );
    let now = at("2025-06-10 19:30:00");

    let report = h
        .scheduler
        .suggest_now("Alice", "+911234", "Chennai", None, now)
        .await
        .unwrap();

    // Band and period are derived, and the pick comes from the hot/evening
    // cell.
    assert_eq!(report.record.band, TempBand::Hot);
    assert_eq!(report.record.period, TimePeriod::Evening);
    let cell_labels: Vec<String> = Catalog::builtin()
        .cell(TempBand::Hot, TimePeriod::Evening)
        .iter()
        .map(|e| e.label.clone())
        .collect();
    assert!(cell_labels.contains(&report.record.food));

    // Exactly one record appended, one SMS attempt, one popup attempt.
    assert_eq!(h.history.read_all().unwrap().len(), 1);
    assert_eq!(h.messenger.sent.lock().unwrap().len(), 1);
    assert_eq!(h.popup.shown.lock().unwrap().len(), 1);
    assert!(report.sms_delivered);
    assert!(report.popup_shown);
    assert!(report.message.starts_with("Good evening, Alice!"));

    // The interactive path armed a job for this period at this clock time.
    let jobs = h.scheduler.table().snapshot();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].key.period, TimePeriod::Evening);
    assert_eq!(jobs[0].fire_at, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    assert_eq!(jobs[0].next_fire, at("2025-06-11 19:30:00"));
}

#[tokio::test]
async fn weather_failure_substitutes_the_fallback_observation() {
    let h = harness(
        StaticWeather::failing(),
        RecordingMessenger::default(),
        MemoryHistory::default(),
    );
    let now = at("2025-06-10 09:00:00");

    let report = h
        .scheduler
        .suggest_now("Alice", "+911234", "Chennai", None, now)
        .await
        .unwrap();

    // Default observation: 25 C / "Unknown" -> moderate band. The pipeline
    // never halts on weather trouble.
    assert_eq!(report.record.temperature, 25.0);
    assert_eq!(report.record.weather, "Unknown");
    assert_eq!(report.record.band, TempBand::Moderate);
    assert_eq!(h.messenger.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn messaging_failure_does_not_block_popup_or_rearm() {
    let h = harness(
        StaticWeather::sunny(36.0),
        RecordingMessenger {
            fail: true,
            ..Default::default()
        },
        MemoryHistory::default(),
    );
    // Registered before 08:30, so only the morning job is ripe at 08:30.
    let registered = at("2025-06-11 07:00:00");
    h.scheduler
        .register_all("Alice", "+911234", "Chennai", None, registered);

    let now = at("2025-06-11 08:30:00");
    let due = h.scheduler.table().due(now);
    assert_eq!(due.len(), 1);

    let report = h.scheduler.fire(&due[0], now).await.unwrap();
    assert!(!report.sms_delivered);
    assert!(report.popup_shown);
    assert_eq!(h.popup.shown.lock().unwrap().len(), 1);

    // Re-armed for the same clock time tomorrow despite the failure.
    let job = h.scheduler.table().get(&due[0]).unwrap();
    assert_eq!(job.state, JobState::Pending);
    assert_eq!(job.next_fire, at("2025-06-12 08:30:00"));
}

#[tokio::test]
async fn append_failure_aborts_dispatch_but_still_rearms() {
    let h = harness(
        StaticWeather::sunny(36.0),
        RecordingMessenger::default(),
        MemoryHistory {
            fail_appends: true,
            ..Default::default()
        },
    );
    h.scheduler
        .register_all("Alice", "+911234", "Chennai", None, at("2025-06-11 07:00:00"));

    let now = at("2025-06-11 08:30:00");
    let due = h.scheduler.table().due(now);
    assert_eq!(due.len(), 1);
    let report = h.scheduler.fire(&due[0], now).await;

    // Nothing was persisted, so nothing goes out -- but the job re-arms.
    assert!(report.is_none());
    assert!(h.messenger.sent.lock().unwrap().is_empty());
    let job = h.scheduler.table().get(&due[0]).unwrap();
    assert_eq!(job.state, JobState::Pending);
    assert_eq!(job.next_fire, at("2025-06-12 08:30:00"));
}

#[tokio::test]
async fn consecutive_firings_never_repeat_within_the_window() {
    let h = harness(
        StaticWeather::sunny(36.0),
        RecordingMessenger::default(),
        MemoryHistory::default(),
    );

    let first = h
        .scheduler
        .suggest_now("Alice", "+911234", "Chennai", None, at("2025-06-10 17:30:00"))
        .await
        .unwrap();
    let second = h
        .scheduler
        .suggest_now("Alice", "+911234", "Chennai", None, at("2025-06-10 19:30:00"))
        .await
        .unwrap();

    // "X" went out two hours ago for this (user, period); it must not
    // repeat while fresh entries remain.
    assert_ne!(first.record.food, second.record.food);
}

#[tokio::test]
async fn bulk_registration_arms_exactly_three_canonical_jobs() {
    let h = harness(
        StaticWeather::sunny(30.0),
        RecordingMessenger::default(),
        MemoryHistory::default(),
    );
    let keys = h
        .scheduler
        .register_all("Alice", "+911234", "Chennai", None, at("2025-06-10 12:00:00"));
    assert_eq!(keys.len(), 3);

    let jobs = h.scheduler.table().snapshot();
    assert_eq!(jobs.len(), 3);
    let times: Vec<String> = jobs
        .iter()
        .map(|j| format!("{}@{}", j.key.period, j.fire_at.format("%H:%M")))
        .collect();
    assert!(times.contains(&"morning@08:30".to_string()));
    assert!(times.contains(&"afternoon@13:30".to_string()));
    assert!(times.contains(&"evening@19:30".to_string()));

    // Registering again replaces rather than duplicates.
    h.scheduler
        .register_all("Alice", "+911234", "Chennai", None, at("2025-06-10 12:05:00"));
    assert_eq!(h.scheduler.table().len(), 3);
}

#[tokio::test]
async fn cancel_tears_a_job_down() {
    let h = harness(
        StaticWeather::sunny(30.0),
        RecordingMessenger::default(),
        MemoryHistory::default(),
    );
    let keys = h
        .scheduler
        .register_all("Alice", "+911234", "Chennai", None, at("2025-06-10 07:00:00"));

    // Cancel the morning job before it comes due at 08:30.
    assert!(h.scheduler.cancel(&keys[0]));
    assert!(!h.scheduler.cancel(&keys[0]));
    assert_eq!(h.scheduler.table().len(), 2);
    assert!(h.scheduler.table().due(at("2025-06-10 09:00:00")).is_empty());
}
