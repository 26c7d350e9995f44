//! Environment chart series for the 24h / 7d / 30d dashboard views.
//!
//! Each dataset is a sine wave around a base value plus uniform noise,
//! clamped to the dataset's bounds. The live series is rolled forward one
//! point at a time: append a new point, drop the oldest.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum step applied to each dataset when the live series rolls.
const ROLL_SPREAD: f64 = 2.0;

/// Chart time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl Period {
    /// Number of points in the window.
    pub fn points(self) -> usize {
        match self {
            Period::Day => 24,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    fn step(self) -> Duration {
        match self {
            Period::Day => Duration::hours(1),
            Period::Week | Period::Month => Duration::days(1),
        }
    }

    /// Axis labels ending at `now`: `HH:MM` for 24h, `Mon D` otherwise.
    pub fn labels(self, now: Timestamp) -> Vec<String> {
        let format = match self {
            Period::Day => "%H:%M",
            Period::Week | Period::Month => "%b %-d",
        };
        (0..self.points())
            .rev()
            .map(|i| (now - self.step() * i as i32).format(format).to_string())
            .collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Day => "24h",
            Period::Week => "7d",
            Period::Month => "30d",
        })
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(Period::Day),
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            other => Err(CoreError::Validation(format!(
                "unknown period '{other}', expected 24h, 7d or 30d"
            ))),
        }
    }
}

/// Shape of one generated dataset.
#[derive(Debug, Clone, Copy)]
struct Wave {
    name: &'static str,
    base: f64,
    amplitude: f64,
    frequency: f64,
    noise: f64,
    min: f64,
    max: f64,
}

const WAVES: [Wave; 3] = [
    Wave {
        name: "temperature",
        base: 24.0,
        amplitude: 5.0,
        frequency: 0.3,
        noise: 2.0,
        min: 15.0,
        max: 35.0,
    },
    Wave {
        name: "humidity",
        base: 65.0,
        amplitude: 10.0,
        frequency: 0.2,
        noise: 5.0,
        min: 30.0,
        max: 90.0,
    },
    Wave {
        name: "soilMoisture",
        base: 78.0,
        amplitude: 8.0,
        frequency: 0.1,
        noise: 3.0,
        min: 40.0,
        max: 95.0,
    },
];

impl Wave {
    fn sample<R: Rng + ?Sized>(&self, i: usize, rng: &mut R) -> f64 {
        let noise = (rng.random::<f64>() - 0.5) * self.noise;
        let value = self.base + (i as f64 * self.frequency).sin() * self.amplitude + noise;
        value.clamp(self.min, self.max)
    }
}

/// One named line on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub values: Vec<f64>,
}

/// Labels plus datasets for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub period: Period,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSeries {
    /// Generate a fresh series for `period` ending at `now`.
    pub fn generate<R: Rng + ?Sized>(period: Period, now: Timestamp, rng: &mut R) -> Self {
        let datasets = WAVES
            .iter()
            .map(|wave| Dataset {
                name: wave.name.to_string(),
                values: (0..period.points()).map(|i| wave.sample(i, rng)).collect(),
            })
            .collect();

        Self {
            period,
            labels: period.labels(now),
            datasets,
        }
    }

    /// Append one point labelled with `now` and drop the oldest.
    ///
    /// Each dataset moves by a uniform step of at most ±2 and never drops
    /// below zero.
    pub fn roll<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R) {
        if !self.labels.is_empty() {
            self.labels.remove(0);
        }
        self.labels.push(now.format("%H:%M:%S").to_string());

        for dataset in &mut self.datasets {
            let Some(&last) = dataset.values.last() else {
                continue;
            };
            let change = rng.random_range(-ROLL_SPREAD..ROLL_SPREAD);
            dataset.values.remove(0);
            dataset.values.push((last + change).max(0.0));
        }
    }
}
