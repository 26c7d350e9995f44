//! Mock crop-disease classifier.
//!
//! There is no model behind this: a crop type and health status are picked at
//! random with an 80-99% confidence. Callers are expected to have validated
//! that the submitted bytes are an image.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

const CROP_TYPES: [&str; 5] = ["Tomato", "Wheat", "Corn", "Potato", "Rice"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Diseased,
}

impl HealthStatus {
    pub fn suggested_action(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Continue regular watering and monitoring",
            HealthStatus::Diseased => "Apply fungicide treatment and improve air circulation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub crop_type: String,
    pub health_status: HealthStatus,
    /// Confidence in percent.
    pub confidence: u8,
    pub suggested_action: String,
}

/// Produce a random detection result.
pub fn simulate_detection<R: Rng + ?Sized>(rng: &mut R) -> DetectionResult {
    let crop_type = CROP_TYPES.choose(rng).copied().unwrap_or(CROP_TYPES[0]);
    let health_status = if rng.random_bool(0.5) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Diseased
    };

    DetectionResult {
        crop_type: crop_type.to_string(),
        health_status,
        confidence: rng.random_range(80..100),
        suggested_action: health_status.suggested_action().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn results_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let result = simulate_detection(&mut rng);
            assert!(CROP_TYPES.contains(&result.crop_type.as_str()));
            assert!((80..100).contains(&result.confidence));
            assert_eq!(
                result.suggested_action,
                result.health_status.suggested_action()
            );
        }
    }

    #[test]
    fn both_statuses_occur() {
        let mut rng = StdRng::seed_from_u64(12);
        let statuses: Vec<_> = (0..50)
            .map(|_| simulate_detection(&mut rng).health_status)
            .collect();
        assert!(statuses.contains(&HealthStatus::Healthy));
        assert!(statuses.contains(&HealthStatus::Diseased));
    }
}
