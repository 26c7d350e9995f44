//! In-memory historical readings table with date filtering and CSV export.
//!
//! Records are kept newest-first and are never removed. Dates and times are
//! rendered in UTC.

use std::collections::VecDeque;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metrics::{classify, Metric, ReadingSnapshot};
use crate::types::Timestamp;

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "Date,Time,Temperature,Humidity,Air Quality,Crop Health,Status";

/// File name offered for the CSV download.
pub const CSV_FILENAME: &str = "crop-disease-detector-data.csv";

/// Number of records generated at startup.
pub const DEFAULT_BACKFILL: usize = 50;

/// Probability that a synthetic backfilled record is flagged `Warning`.
const BACKFILL_WARNING_RATE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Normal,
    Warning,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Normal => "Normal",
            RecordStatus::Warning => "Warning",
        }
    }
}

/// One row of the historical table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRecord {
    pub recorded_at: Timestamp,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub temperature: f64,
    pub humidity: f64,
    pub air_quality: f64,
    pub crop_health: f64,
    pub status: RecordStatus,
}

impl HistoricalRecord {
    fn at(
        recorded_at: Timestamp,
        temperature: f64,
        humidity: f64,
        air_quality: f64,
        crop_health: f64,
        status: RecordStatus,
    ) -> Self {
        let time = recorded_at.time();
        Self {
            recorded_at,
            date: recorded_at.date_naive(),
            time: time.with_nanosecond(0).unwrap_or(time),
            temperature: Metric::Temperature.round_for_display(temperature),
            humidity: Metric::Humidity.round_for_display(humidity),
            air_quality: Metric::AirQuality.round_for_display(air_quality),
            crop_health: Metric::CropHealth.round_for_display(crop_health),
            status,
        }
    }

    /// Build a record from the current readings.
    ///
    /// The status is `Warning` whenever any sensor is outside its good band.
    pub fn from_snapshot(readings: &ReadingSnapshot, now: Timestamp) -> Result<Self, CoreError> {
        let value = |metric: Metric| {
            readings
                .get(&metric)
                .map(|r| r.value)
                .ok_or(CoreError::MissingReading(metric))
        };
        let temperature = value(Metric::Temperature)?;
        let humidity = value(Metric::Humidity)?;
        let air_quality = value(Metric::AirQuality)?;
        let crop_health = value(Metric::CropHealth)?;

        let all_good = readings.values().all(|r| classify(r.metric, r.value).is_good());
        let status = if all_good {
            RecordStatus::Normal
        } else {
            RecordStatus::Warning
        };

        Ok(Self::at(now, temperature, humidity, air_quality, crop_health, status))
    }

    /// Generate a random record at `recorded_at`.
    fn synthetic<R: Rng + ?Sized>(recorded_at: Timestamp, rng: &mut R) -> Self {
        let status = if rng.random_bool(BACKFILL_WARNING_RATE) {
            RecordStatus::Warning
        } else {
            RecordStatus::Normal
        };
        Self::at(
            recorded_at,
            rng.random_range(15.0..35.0),
            rng.random_range(40.0..80.0),
            rng.random_range(50.0..100.0),
            rng.random_range(70.0..100.0),
            status,
        )
    }

    /// Render the record as one CSV line (no escaping; fields never contain commas).
    pub fn csv_row(&self) -> String {
        [
            self.date.format("%Y-%m-%d").to_string(),
            self.time.format("%H:%M:%S").to_string(),
            format!("{:.1}", self.temperature),
            format!("{:.0}", self.humidity),
            format!("{:.0}", self.air_quality),
            format!("{:.0}", self.crop_health),
            self.status.as_str().to_string(),
        ]
        .join(",")
    }
}

/// Append-only historical table, newest record first.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: VecDeque<HistoricalRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate `count` synthetic records at one-hour spacing ending at `now`.
    ///
    /// Generated records go after any existing ones, newest first.
    pub fn backfill<R: Rng + ?Sized>(&mut self, count: usize, now: Timestamp, rng: &mut R) {
        for i in 0..count {
            let at = now - Duration::hours(i as i64);
            self.records.push_back(HistoricalRecord::synthetic(at, rng));
        }
    }

    /// Add a new record at the front of the table.
    pub fn append(&mut self, record: HistoricalRecord) {
        self.records.push_front(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &HistoricalRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose date lies within `[start, end]`; a missing bound is open.
    ///
    /// An inverted range yields no records.
    pub fn filter(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<HistoricalRecord> {
        self.records
            .iter()
            .filter(|r| start.map_or(true, |s| r.date >= s) && end.map_or(true, |e| r.date <= e))
            .cloned()
            .collect()
    }

    /// CSV export of the whole table.
    pub fn to_csv(&self) -> String {
        to_csv(self.records.iter())
    }
}

/// Serialize records as CSV with the standard header.
pub fn to_csv<'a>(records: impl IntoIterator<Item = &'a HistoricalRecord>) -> String {
    std::iter::once(CSV_HEADER.to_string())
        .chain(records.into_iter().map(HistoricalRecord::csv_row))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::metrics::Reading;

    fn noon() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn backfilled(count: usize) -> HistoryStore {
        let mut rng = StdRng::seed_from_u64(9);
        let mut store = HistoryStore::new();
        store.backfill(count, noon(), &mut rng);
        store
    }

    #[test]
    fn backfill_spaces_records_one_hour_apart_newest_first() {
        let store = backfilled(50);
        assert_eq!(store.len(), 50);

        let stamps: Vec<_> = store.records().map(|r| r.recorded_at).collect();
        assert_eq!(stamps[0], noon());
        for pair in stamps.windows(2) {
            assert_eq!(pair[0] - pair[1], Duration::hours(1));
        }
    }

    #[test]
    fn backfilled_values_stay_in_generation_ranges() {
        for record in backfilled(200).records() {
            assert!((15.0..=35.0).contains(&record.temperature));
            assert!((40.0..=80.0).contains(&record.humidity));
            assert!((50.0..=100.0).contains(&record.air_quality));
            assert!((70.0..=100.0).contains(&record.crop_health));
        }
    }

    #[test]
    fn csv_has_header_and_seven_fields_per_line() {
        let store = backfilled(50);
        let csv = store.to_csv();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 51);
        let header_fields = CSV_HEADER.split(',').count();
        assert_eq!(header_fields, 7);
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), header_fields, "bad row: {line}");
        }
    }

    #[test]
    fn csv_row_format() {
        let record = HistoricalRecord::at(noon(), 24.26, 64.6, 75.2, 85.0, RecordStatus::Normal);
        assert_eq!(record.csv_row(), "2026-03-10,12:00:00,24.3,65,75,85,Normal");
    }

    #[test]
    fn empty_store_exports_only_header() {
        assert_eq!(HistoryStore::new().to_csv(), CSV_HEADER);
    }

    #[test]
    fn filter_is_inclusive_on_both_ends() {
        // 50 hourly records ending at noon on the 10th span the 8th..10th.
        let store = backfilled(50);
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();

        let only_9th = store.filter(Some(day(9)), Some(day(9)));
        assert_eq!(only_9th.len(), 24);
        assert!(only_9th.iter().all(|r| r.date == day(9)));

        let from_9th = store.filter(Some(day(9)), None);
        assert_eq!(from_9th.len(), 24 + 13);

        let everything = store.filter(None, None);
        assert_eq!(everything.len(), 50);
    }

    #[test]
    fn inverted_range_is_empty() {
        let store = backfilled(10);
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
        assert!(store.filter(Some(day(10)), Some(day(1))).is_empty());
    }

    #[test]
    fn append_puts_record_first() {
        let mut store = backfilled(3);
        let later = noon() + Duration::hours(1);
        let readings: ReadingSnapshot = Metric::ALL
            .into_iter()
            .map(|m| {
                let value = match m {
                    Metric::Temperature => 25.0,
                    Metric::Humidity => 60.0,
                    Metric::AirQuality => 70.0,
                    Metric::CropHealth => 90.0,
                };
                (m, Reading::new(m, value, later))
            })
            .collect();

        store.append(HistoricalRecord::from_snapshot(&readings, later).unwrap());
        let first = store.records().next().unwrap();
        assert_eq!(first.recorded_at, later);
        assert_eq!(first.status, RecordStatus::Normal);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn snapshot_outside_good_band_is_a_warning() {
        let now = noon();
        let mut readings: ReadingSnapshot = Metric::ALL
            .into_iter()
            .map(|m| (m, Reading::new(m, 25.0, now)))
            .collect();
        readings.insert(Metric::AirQuality, Reading::new(Metric::AirQuality, 120.0, now));
        readings.insert(Metric::Humidity, Reading::new(Metric::Humidity, 60.0, now));
        readings.insert(Metric::CropHealth, Reading::new(Metric::CropHealth, 90.0, now));

        let record = HistoricalRecord::from_snapshot(&readings, now).unwrap();
        assert_eq!(record.status, RecordStatus::Warning);
    }

    #[test]
    fn snapshot_missing_metric_fails() {
        let readings = ReadingSnapshot::new();
        assert_matches!(
            HistoricalRecord::from_snapshot(&readings, noon()),
            Err(CoreError::MissingReading(_))
        );
    }
}
