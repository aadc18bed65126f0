//! Schedule reconstruction from the suggestion history.
//!
//! The append-only history is the source of truth for "where was each
//! user's schedule left off": for every (user, period) the most recent
//! record's clock time becomes tomorrow's fire time. No separate
//! schedule-state file exists.

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use super::{JobKey, ScheduledJob};
use crate::history::SuggestionRecord;

/// Rebuild the job set from history records.
///
/// Records are grouped by (name, phone) and then by period; only the most
/// recent record per group survives. Its hour:minute (seconds dropped)
/// becomes the fire time, armed for tomorrow. Category preferences are not
/// recoverable from history, so recovered jobs carry none.
pub fn recover_jobs(records: &[SuggestionRecord], now: NaiveDateTime) -> Vec<ScheduledJob> {
    let mut latest: HashMap<JobKey, &SuggestionRecord> = HashMap::new();
    for record in records {
        let key = JobKey {
            name: record.name.clone(),
            phone: record.phone.clone(),
            period: record.period,
        };
        match latest.get(&key) {
            Some(existing) if existing.sent_at >= record.sent_at => {}
            _ => {
                latest.insert(key, record);
            }
        }
    }

    let mut jobs: Vec<ScheduledJob> = latest
        .into_iter()
        .map(|(key, record)| {
            let fire_at =
                NaiveTime::from_hms_opt(record.sent_at.hour(), record.sent_at.minute(), 0)
                    .unwrap_or_default();
            ScheduledJob::armed_for_tomorrow(key, &record.location, fire_at, None, now)
        })
        .collect();
    jobs.sort_by(|a, b| a.key.cmp(&b.key));
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FoodCategory;
    use crate::classify::{TempBand, TimePeriod};
    use crate::history::TIMESTAMP_FORMAT;
    use crate::scheduler::JobState;

    fn record(
        name: &str,
        phone: &str,
        location: &str,
        sent_at: &str,
        period: TimePeriod,
    ) -> SuggestionRecord {
        SuggestionRecord {
            name: name.to_string(),
            phone: phone.to_string(),
            location: location.to_string(),
            weather: "Sunny".to_string(),
            temperature: 30.0,
            band: TempBand::Moderate,
            food: "Garden Salad - Fresh and nutritious".to_string(),
            category: FoodCategory::Starter,
            sent_at: NaiveDateTime::parse_from_str(sent_at, TIMESTAMP_FORMAT).unwrap(),
            period,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-06-10 21:00:00", TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn one_job_per_user_period_at_the_recorded_clock_time() {
        let records = vec![
            record("Alice", "+100", "Chennai", "2025-06-09 08:05:30", TimePeriod::Morning),
            record("Alice", "+100", "Chennai", "2025-06-09 19:40:12", TimePeriod::Evening),
        ];
        let jobs = recover_jobs(&records, now());
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].key.period, TimePeriod::Morning);
        assert_eq!(jobs[0].fire_at, NaiveTime::from_hms_opt(8, 5, 0).unwrap());
        assert_eq!(jobs[1].key.period, TimePeriod::Evening);
        assert_eq!(jobs[1].fire_at, NaiveTime::from_hms_opt(19, 40, 0).unwrap());

        // No afternoon history, no afternoon job.
        assert!(jobs.iter().all(|j| j.key.period != TimePeriod::Afternoon));

        // Armed for tomorrow, pending.
        for job in &jobs {
            assert_eq!(job.next_fire.date(), now().date().succ_opt().unwrap());
            assert_eq!(job.state, JobState::Pending);
        }
    }

    #[test]
    fn most_recent_record_per_period_wins() {
        let records = vec![
            record("Alice", "+100", "Chennai", "2025-06-08 08:05:00", TimePeriod::Morning),
            record("Alice", "+100", "Mumbai", "2025-06-09 08:45:00", TimePeriod::Morning),
        ];
        let jobs = recover_jobs(&records, now());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].fire_at, NaiveTime::from_hms_opt(8, 45, 0).unwrap());
        assert_eq!(jobs[0].location, "Mumbai");
    }

    #[test]
    fn users_are_distinguished_by_name_and_phone() {
        let records = vec![
            record("Alice", "+100", "Chennai", "2025-06-09 08:05:00", TimePeriod::Morning),
            record("Alice", "+200", "Delhi", "2025-06-09 08:10:00", TimePeriod::Morning),
            record("Bob", "+300", "Pune", "2025-06-09 13:30:00", TimePeriod::Afternoon),
        ];
        let jobs = recover_jobs(&records, now());
        assert_eq!(jobs.len(), 3);
    }

    #[test]
    fn empty_history_recovers_nothing() {
        assert!(recover_jobs(&[], now()).is_empty());
    }
}
