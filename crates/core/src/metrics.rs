//! Farm sensor metrics, readings, and per-sensor status classification.
//!
//! A [`Reading`] is one timestamped value for a [`Metric`]. The status bands in
//! [`classify`] drive the dashboard's sensor badges and decide whether a
//! sampled history row is marked `Warning`. They are intentionally tighter
//! than the alert thresholds in [`crate::thresholds`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alert::Severity;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// A tracked environment metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Temperature,
    Humidity,
    AirQuality,
    CropHealth,
}

impl Metric {
    /// Every metric, in dashboard display order.
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::AirQuality,
        Metric::CropHealth,
    ];

    /// Unit suffix shown next to the value.
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity | Metric::CropHealth => "%",
            Metric::AirQuality => "AQI",
        }
    }

    /// Human-readable column / card title.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::AirQuality => "Air Quality",
            Metric::CropHealth => "Crop Health",
        }
    }

    /// Number of decimals the dashboard shows for this metric.
    pub fn precision(self) -> usize {
        match self {
            Metric::Temperature => 1,
            _ => 0,
        }
    }

    /// Round `value` to the precision the dashboard displays.
    pub fn round_for_display(self, value: f64) -> f64 {
        let factor = 10f64.powi(self.precision() as i32);
        (value * factor).round() / factor
    }

    /// Render `value` with unit, e.g. `24.3°C`, `65%`, `75 AQI`.
    pub fn format_value(self, value: f64) -> String {
        let precision = self.precision();
        match self {
            Metric::AirQuality => format!("{value:.precision$} {}", self.unit()),
            _ => format!("{value:.precision$}{}", self.unit()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One timestamped sensor value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub metric: Metric,
    pub value: f64,
    pub unit: String,
    pub timestamp: Timestamp,
}

impl Reading {
    pub fn new(metric: Metric, value: f64, timestamp: Timestamp) -> Self {
        Self {
            metric,
            value,
            unit: metric.unit().to_string(),
            timestamp,
        }
    }

    /// The value as the dashboard shows it (rounded to display precision).
    pub fn displayed_value(&self) -> f64 {
        self.metric.round_for_display(self.value)
    }

    /// The formatted value with its unit.
    pub fn formatted(&self) -> String {
        self.metric.format_value(self.value)
    }
}

/// Latest reading per metric, as published by the simulator.
pub type ReadingSnapshot = BTreeMap<Metric, Reading>;

// ---------------------------------------------------------------------------
// Sensor status
// ---------------------------------------------------------------------------

/// Badge text shown under a sensor card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLabel {
    Low,
    High,
    Normal,
    Good,
    Moderate,
    Poor,
    Fair,
    Healthy,
}

/// Classification of a single reading for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorStatus {
    pub label: StatusLabel,
    pub indicator: Severity,
}

impl SensorStatus {
    fn new(label: StatusLabel, indicator: Severity) -> Self {
        Self { label, indicator }
    }

    pub fn is_good(&self) -> bool {
        self.indicator == Severity::Good
    }
}

/// Classify a value into its display status band.
pub fn classify(metric: Metric, value: f64) -> SensorStatus {
    use StatusLabel::*;

    match metric {
        Metric::Temperature => {
            if value < 20.0 {
                SensorStatus::new(Low, Severity::Warning)
            } else if value > 30.0 {
                SensorStatus::new(High, Severity::Warning)
            } else {
                SensorStatus::new(Normal, Severity::Good)
            }
        }
        Metric::Humidity => {
            if value < 40.0 {
                SensorStatus::new(Low, Severity::Warning)
            } else if value > 80.0 {
                SensorStatus::new(High, Severity::Warning)
            } else {
                SensorStatus::new(Normal, Severity::Good)
            }
        }
        Metric::AirQuality => {
            if value > 100.0 {
                SensorStatus::new(Poor, Severity::Danger)
            } else if value > 80.0 {
                SensorStatus::new(Moderate, Severity::Warning)
            } else {
                SensorStatus::new(Good, Severity::Good)
            }
        }
        Metric::CropHealth => {
            if value < 60.0 {
                SensorStatus::new(Poor, Severity::Danger)
            } else if value < 80.0 {
                SensorStatus::new(Fair, Severity::Warning)
            } else {
                SensorStatus::new(Healthy, Severity::Good)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
