//! Synthetic sensor reading generator.
//!
//! Each tick moves every metric by a uniform random delta and clamps the
//! result to the metric's display bounds. The bounds are deliberately wider
//! than (or equal to) the alert thresholds.

use rand::Rng;
use serde::Serialize;

use crate::metrics::{Metric, Reading, ReadingSnapshot};
use crate::types::Timestamp;

/// Random walk parameters for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationProfile {
    pub metric: Metric,
    /// Hard lower display bound.
    pub min: f64,
    /// Hard upper display bound.
    pub max: f64,
    /// Half-width of the uniform delta range: deltas fall in `[-spread, spread)`.
    pub spread: f64,
    /// Value before the first tick.
    pub initial: f64,
}

impl SimulationProfile {
    /// Default profile for `metric`.
    pub fn for_metric(metric: Metric) -> Self {
        let (min, max, spread, initial) = match metric {
            Metric::Temperature => (15.0, 35.0, 1.0, 24.0),
            Metric::Humidity => (30.0, 90.0, 1.0, 65.0),
            Metric::AirQuality => (50.0, 150.0, 5.0, 75.0),
            Metric::CropHealth => (40.0, 100.0, 1.0, 85.0),
        };
        Self {
            metric,
            min,
            max,
            spread,
            initial,
        }
    }

    fn step<R: Rng + ?Sized>(&self, current: f64, rng: &mut R) -> f64 {
        let delta = if self.spread > 0.0 {
            rng.random_range(-self.spread..self.spread)
        } else {
            0.0
        };
        (current + delta).clamp(self.min, self.max)
    }
}

/// Owns the current value of every metric and advances them on each tick.
#[derive(Debug, Clone)]
pub struct MetricsSimulator {
    profiles: Vec<SimulationProfile>,
    current: ReadingSnapshot,
}

impl MetricsSimulator {
    /// Create a simulator with the default profiles, seeded at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self::with_profiles(
            Metric::ALL.into_iter().map(SimulationProfile::for_metric).collect(),
            now,
        )
    }

    /// Create a simulator from explicit profiles.
    ///
    /// Initial values outside a profile's bounds are clamped.
    pub fn with_profiles(profiles: Vec<SimulationProfile>, now: Timestamp) -> Self {
        let current = profiles
            .iter()
            .map(|p| {
                let value = p.initial.clamp(p.min, p.max);
                (p.metric, Reading::new(p.metric, value, now))
            })
            .collect();
        Self { profiles, current }
    }

    pub fn profiles(&self) -> &[SimulationProfile] {
        &self.profiles
    }

    /// The latest reading per metric.
    pub fn snapshot(&self) -> &ReadingSnapshot {
        &self.current
    }

    /// Advance every metric by one step and return the new snapshot.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Timestamp) -> &ReadingSnapshot {
        for profile in &self.profiles {
            let previous = self
                .current
                .get(&profile.metric)
                .map(|r| r.value)
                .unwrap_or(profile.initial);
            let value = profile.step(previous, rng);
            self.current
                .insert(profile.metric, Reading::new(profile.metric, value, now));
        }
        &self.current
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn initial_snapshot_has_every_metric() {
        let sim = MetricsSimulator::new(Utc::now());
        assert_eq!(sim.snapshot().len(), Metric::ALL.len());
        assert_eq!(sim.snapshot()[&Metric::Temperature].value, 24.0);
        assert_eq!(sim.snapshot()[&Metric::AirQuality].unit, "AQI");
    }

    #[test]
    fn readings_stay_within_display_bounds_for_many_seeds() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sim = MetricsSimulator::new(Utc::now());
            for _ in 0..500 {
                let now = Utc::now();
                sim.tick(&mut rng, now);
                for profile in sim.profiles() {
                    let value = sim.snapshot()[&profile.metric].value;
                    assert!(
                        (profile.min..=profile.max).contains(&value),
                        "{} out of bounds: {value}",
                        profile.metric
                    );
                }
            }
        }
    }

    #[test]
    fn values_pinned_at_bound_stay_clamped() {
        let profile = SimulationProfile {
            metric: Metric::Temperature,
            min: 15.0,
            max: 35.0,
            spread: 50.0,
            initial: 35.0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut sim = MetricsSimulator::with_profiles(vec![profile], Utc::now());
        for _ in 0..100 {
            let value = sim.tick(&mut rng, Utc::now())[&Metric::Temperature].value;
            assert!((15.0..=35.0).contains(&value));
        }
    }

    #[test]
    fn tick_changes_by_at_most_spread() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sim = MetricsSimulator::new(Utc::now());
        let before = sim.snapshot()[&Metric::AirQuality].value;
        let after = sim.tick(&mut rng, Utc::now())[&Metric::AirQuality].value;
        assert!((after - before).abs() <= 5.0);
    }

    #[test]
    fn tick_stamps_readings_with_given_time() {
        let mut rng = StdRng::seed_from_u64(1);
        let start = Utc::now();
        let mut sim = MetricsSimulator::new(start);
        let later = start + chrono::Duration::seconds(5);
        sim.tick(&mut rng, later);
        assert!(sim.snapshot().values().all(|r| r.timestamp == later));
    }

    #[test]
    fn out_of_range_initial_value_is_clamped() {
        let mut profile = SimulationProfile::for_metric(Metric::Humidity);
        profile.initial = 500.0;
        let sim = MetricsSimulator::with_profiles(vec![profile], Utc::now());
        assert_eq!(sim.snapshot()[&Metric::Humidity].value, 90.0);
    }
}
