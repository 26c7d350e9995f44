//! Threshold evaluation engine for farm sensor readings.
//!
//! Pure logic — no timers, no shared state. The caller fetches the latest
//! [`ReadingSnapshot`] and passes it in together with the immutable
//! [`ThresholdTable`] loaded at startup.
//!
//! Policy per metric:
//!
//! | metric      | check                                             |
//! |-------------|---------------------------------------------------|
//! | temperature | `> max` warning, `< min` warning                  |
//! | humidity    | `> max` warning, `< min` warning                  |
//! | airQuality  | `> max` danger (Poor), `> warn_above` warning     |
//! | cropHealth  | `< min` warning                                   |
//!
//! Values are compared at display precision so an alert always agrees with
//! what the dashboard card shows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::alert::{AlertCause, NewAlert, Severity};
use crate::error::CoreError;
use crate::metrics::{Metric, Reading, ReadingSnapshot};

/// Static alert bounds for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub metric: Metric,
    pub min: f64,
    pub max: f64,
    /// Start of the warning band below `max`. Only air quality uses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_above: Option<f64>,
}

impl Threshold {
    pub fn new(metric: Metric, min: f64, max: f64) -> Self {
        Self {
            metric,
            min,
            max,
            warn_above: None,
        }
    }

    pub fn with_warn_above(mut self, warn_above: f64) -> Self {
        self.warn_above = Some(warn_above);
        self
    }
}

/// One threshold per metric plus evaluation options. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdTable {
    thresholds: BTreeMap<Metric, Threshold>,
    /// Collapse both air quality bands into a single `> 80` danger alert,
    /// as earlier dashboard builds did.
    legacy_air_quality: bool,
}

impl ThresholdTable {
    /// Build a table from explicit thresholds.
    ///
    /// Every metric must be present exactly once and have `min <= max`, with
    /// any warning band inside the bounds.
    pub fn new(thresholds: Vec<Threshold>) -> Result<Self, CoreError> {
        let mut map = BTreeMap::new();
        for t in thresholds {
            if !(t.min <= t.max) {
                return Err(CoreError::Validation(format!(
                    "threshold for {} has min {} above max {}",
                    t.metric, t.min, t.max
                )));
            }
            if let Some(warn) = t.warn_above {
                if !(t.min <= warn && warn <= t.max) {
                    return Err(CoreError::Validation(format!(
                        "warning band {warn} for {} is outside {}..{}",
                        t.metric, t.min, t.max
                    )));
                }
            }
            if map.insert(t.metric, t).is_some() {
                return Err(CoreError::Validation(format!(
                    "duplicate threshold for {}",
                    t.metric
                )));
            }
        }
        if let Some(missing) = Metric::ALL.iter().find(|m| !map.contains_key(m)) {
            return Err(CoreError::Validation(format!(
                "no threshold configured for {missing}"
            )));
        }
        Ok(Self {
            thresholds: map,
            legacy_air_quality: false,
        })
    }

    /// Enable or disable the legacy single-band air quality policy.
    pub fn with_legacy_air_quality(mut self, enabled: bool) -> Self {
        self.legacy_air_quality = enabled;
        self
    }

    pub fn legacy_air_quality(&self) -> bool {
        self.legacy_air_quality
    }

    pub fn get(&self, metric: Metric) -> &Threshold {
        // Construction guarantees every metric is present.
        &self.thresholds[&metric]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Threshold> {
        self.thresholds.values()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let thresholds = [
            Threshold::new(Metric::Temperature, 15.0, 35.0),
            Threshold::new(Metric::Humidity, 30.0, 90.0),
            Threshold::new(Metric::AirQuality, 0.0, 100.0).with_warn_above(80.0),
            Threshold::new(Metric::CropHealth, 60.0, 100.0),
        ]
        .into_iter()
        .map(|t| (t.metric, t))
        .collect();

        Self {
            thresholds,
            legacy_air_quality: false,
        }
    }
}

/// Evaluate the latest readings and return the alerts they trigger.
///
/// Fails if any metric has no reading or a non-finite value; the caller is
/// expected to skip the tick in that case.
pub fn evaluate(
    readings: &ReadingSnapshot,
    table: &ThresholdTable,
) -> Result<Vec<NewAlert>, CoreError> {
    let mut alerts = Vec::new();

    for metric in Metric::ALL {
        let reading = readings
            .get(&metric)
            .ok_or(CoreError::MissingReading(metric))?;
        if !reading.value.is_finite() {
            return Err(CoreError::InvalidReading {
                metric,
                value: reading.value,
            });
        }
        if let Some(alert) = check_reading(reading, table) {
            alerts.push(alert);
        }
    }

    Ok(alerts)
}

/// Compare a single reading against its threshold.
pub fn check_reading(reading: &Reading, table: &ThresholdTable) -> Option<NewAlert> {
    let threshold = table.get(reading.metric);
    let value = reading.displayed_value();
    let shown = reading.metric.format_value(value);

    match reading.metric {
        Metric::Temperature => {
            if value > threshold.max {
                Some(violation(
                    reading.metric,
                    AlertCause::AboveMax,
                    Severity::Warning,
                    "High Temperature Alert",
                    format!(
                        "Temperature is {shown}, which is above the safe threshold of {}°C.",
                        threshold.max
                    ),
                ))
            } else if value < threshold.min {
                Some(violation(
                    reading.metric,
                    AlertCause::BelowMin,
                    Severity::Warning,
                    "Low Temperature Alert",
                    format!(
                        "Temperature is {shown}, which is below the safe threshold of {}°C.",
                        threshold.min
                    ),
                ))
            } else {
                None
            }
        }
        Metric::Humidity => {
            if value > threshold.max {
                Some(violation(
                    reading.metric,
                    AlertCause::AboveMax,
                    Severity::Warning,
                    "High Humidity Alert",
                    format!("Humidity is {shown}, which is above the optimal range."),
                ))
            } else if value < threshold.min {
                Some(violation(
                    reading.metric,
                    AlertCause::BelowMin,
                    Severity::Warning,
                    "Low Humidity Alert",
                    format!("Humidity is {shown}, which is below the optimal range."),
                ))
            } else {
                None
            }
        }
        Metric::AirQuality => {
            let index = format!("{value:.0}");
            let warn_above = threshold.warn_above;
            if table.legacy_air_quality {
                let limit = warn_above.unwrap_or(threshold.max);
                return (value > limit).then(|| {
                    violation(
                        reading.metric,
                        AlertCause::AboveMax,
                        Severity::Danger,
                        "Poor Air Quality Alert",
                        format!("Air Quality Index is {index}, which indicates poor air quality."),
                    )
                });
            }
            if value > threshold.max {
                Some(violation(
                    reading.metric,
                    AlertCause::AboveMax,
                    Severity::Danger,
                    "Poor Air Quality Alert",
                    format!("Air Quality Index is {index}, which indicates poor air quality."),
                ))
            } else if warn_above.is_some_and(|warn| value > warn) {
                Some(violation(
                    reading.metric,
                    AlertCause::AboveMax,
                    Severity::Warning,
                    "Moderate Air Quality Alert",
                    format!("Air Quality Index is {index}, which indicates moderate air quality."),
                ))
            } else {
                None
            }
        }
        Metric::CropHealth => (value < threshold.min).then(|| {
            violation(
                reading.metric,
                AlertCause::BelowMin,
                Severity::Warning,
                "Crop Health Warning",
                format!("Crop health is at {shown}, which requires immediate attention."),
            )
        }),
    }
}

fn violation(
    metric: Metric,
    cause: AlertCause,
    severity: Severity,
    title: &str,
    message: String,
) -> NewAlert {
    NewAlert {
        severity,
        metric: Some(metric),
        cause,
        title: title.to_string(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
