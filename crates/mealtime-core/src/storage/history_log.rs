//! CSV-backed suggestion history log.
//!
//! Append-only, fixed column order, mandatory header row:
//! `Name,Phone,Location,Weather,Temperature,Category,SuggestedFood,Timestamp,TimePeriod`
//!
//! The `Category` column carries the temperature band string -- the schema
//! predates the food-category distinction and stays stable for old readers.
//! Rows written before the `TimePeriod` column existed have eight fields;
//! their period is derived from the timestamp hour on read. Rows that fail
//! to parse below that bar are skipped, never an error.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{NaiveDateTime, Timelike};

use super::default_history_path;
use crate::catalog::Catalog;
use crate::classify::{TempBand, TimePeriod};
use crate::error::HistoryError;
use crate::history::{HistoryStore, SuggestionRecord, TIMESTAMP_FORMAT};

pub const CSV_HEADERS: [&str; 9] = [
    "Name",
    "Phone",
    "Location",
    "Weather",
    "Temperature",
    "Category",
    "SuggestedFood",
    "Timestamp",
    "TimePeriod",
];

/// Append-only CSV history store.
///
/// Appends are serialized by an internal lock (single-writer discipline)
/// and fsynced before returning.
pub struct CsvHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvHistory {
    /// Open the log at the default location (`<data_dir>/suggestions.csv`).
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be resolved.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_path(default_history_path()?))
    }

    /// Open the log at an explicit path (tests, config override). The file
    /// is created lazily on first append; a missing file reads as empty.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn parse_row(row: &csv::StringRecord, catalog: &Catalog) -> Option<SuggestionRecord> {
        let temperature: f64 = row.get(4)?.trim().parse().ok()?;
        let sent_at =
            NaiveDateTime::parse_from_str(row.get(7)?.trim(), TIMESTAMP_FORMAT).ok()?;
        let food = row.get(6)?.to_string();

        Some(SuggestionRecord {
            name: row.get(0)?.to_string(),
            phone: row.get(1)?.to_string(),
            location: row.get(2)?.to_string(),
            weather: row.get(3)?.to_string(),
            temperature,
            band: TempBand::parse_or_derive(row.get(5)?.trim(), temperature),
            category: catalog.category_of(&food),
            food,
            period: TimePeriod::parse_or_derive(row.get(8).unwrap_or(""), sent_at.hour()),
            sent_at,
        })
    }
}

impl HistoryStore for CsvHistory {
    fn append(&self, record: &SuggestionRecord) -> Result<(), HistoryError> {
        let append_err = |message: String| HistoryError::AppendFailed(message);

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| append_err("writer lock poisoned".into()))?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| HistoryError::OpenFailed {
                path: self.path.clone(),
                source,
            })?;
        let needs_header = file.metadata().map(|m| m.len() == 0).unwrap_or(true);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(CSV_HEADERS)
                .map_err(|e| append_err(e.to_string()))?;
        }
        let temperature = record.temperature.to_string();
        let sent_at = record.sent_at.format(TIMESTAMP_FORMAT).to_string();
        writer
            .write_record([
                record.name.as_str(),
                record.phone.as_str(),
                record.location.as_str(),
                record.weather.as_str(),
                temperature.as_str(),
                record.band.as_str(),
                record.food.as_str(),
                sent_at.as_str(),
                record.period.as_str(),
            ])
            .map_err(|e| append_err(e.to_string()))?;
        writer.flush().map_err(|e| append_err(e.to_string()))?;

        // Durable before returning.
        let file = writer
            .into_inner()
            .map_err(|e| append_err(e.to_string()))?;
        file.sync_all().map_err(|e| append_err(e.to_string()))?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<SuggestionRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(HistoryError::from)?;

        let catalog = Catalog::builtin();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(_) => continue, // damaged row, skip
            };
            if let Some(record) = Self::parse_row(&row, &catalog) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FoodCategory;

    fn record(name: &str, food: &str, sent_at: &str, period: TimePeriod) -> SuggestionRecord {
        SuggestionRecord {
            name: name.to_string(),
            phone: "+911234".to_string(),
            location: "Chennai".to_string(),
            weather: "Sunny".to_string(),
            temperature: 36.5,
            band: TempBand::Hot,
            food: food.to_string(),
            category: FoodCategory::Dessert,
            sent_at: NaiveDateTime::parse_from_str(sent_at, TIMESTAMP_FORMAT).unwrap(),
            period,
        }
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvHistory::with_path(dir.path().join("nothing.csv"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvHistory::with_path(dir.path().join("suggestions.csv"));

        store
            .append(&record(
                "Alice",
                "Frozen Yogurt - Guilt-free chill scoop",
                "2025-06-10 19:40:00",
                TimePeriod::Evening,
            ))
            .unwrap();
        store
            .append(&record(
                "Bob",
                "Mint Lemonade - Zesty citrus cooler",
                "2025-06-10 20:05:12",
                TimePeriod::Evening,
            ))
            .unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alice");
        assert_eq!(records[0].band, TempBand::Hot);
        assert_eq!(records[0].period, TimePeriod::Evening);
        assert_eq!(records[0].temperature, 36.5);
        assert_eq!(
            records[0].sent_at.format(TIMESTAMP_FORMAT).to_string(),
            "2025-06-10 19:40:00"
        );
        // Category is recovered by catalog label lookup.
        assert_eq!(records[1].category, FoodCategory::Drink);
    }

    #[test]
    fn header_is_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suggestions.csv");
        let store = CsvHistory::with_path(path.clone());

        for i in 0..3 {
            store
                .append(&record(
                    &format!("User{i}"),
                    "Veg Soup - Healthy and hearty",
                    "2025-06-10 19:40:00",
                    TimePeriod::Evening,
                ))
                .unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("Name,")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn legacy_row_without_period_column_derives_from_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suggestions.csv");
        std::fs::write(
            &path,
            "Name,Phone,Location,Weather,Temperature,Category,SuggestedFood,Timestamp\n\
             Alice,+911234,Chennai,Sunny,36.5,hot,Frozen Yogurt - Guilt-free chill scoop,2025-06-10 19:40:00\n",
        )
        .unwrap();

        let store = CsvHistory::with_path(path);
        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period, TimePeriod::Evening);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suggestions.csv");
        std::fs::write(
            &path,
            "Name,Phone,Location,Weather,Temperature,Category,SuggestedFood,Timestamp,TimePeriod\n\
             Alice,+911234,Chennai\n\
             Alice,+911234,Chennai,Sunny,not-a-number,hot,Garden Salad - Fresh and nutritious,2025-06-10 19:40:00,evening\n\
             Alice,+911234,Chennai,Sunny,36.5,hot,Garden Salad - Fresh and nutritious,not-a-timestamp,evening\n\
             Alice,+911234,Chennai,Sunny,36.5,hot,Garden Salad - Fresh and nutritious,2025-06-10 19:40:00,evening\n",
        )
        .unwrap();

        let store = CsvHistory::with_path(path);
        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].food, "Garden Salad - Fresh and nutritious");
    }

    #[test]
    fn unknown_band_string_is_derived_from_temperature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suggestions.csv");
        std::fs::write(
            &path,
            "Name,Phone,Location,Weather,Temperature,Category,SuggestedFood,Timestamp,TimePeriod\n\
             Alice,+911234,Chennai,Drizzle,12.0,???,Hot Oatmeal - Warming start to day,2025-06-10 08:00:00,morning\n",
        )
        .unwrap();

        let store = CsvHistory::with_path(path);
        let records = store.read_all().unwrap();
        assert_eq!(records[0].band, TempBand::Cold);
    }
}
