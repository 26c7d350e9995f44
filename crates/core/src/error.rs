use crate::metrics::Metric;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No current reading for {0}")]
    MissingReading(Metric),

    #[error("Reading for {metric} is not a finite number: {value}")]
    InvalidReading { metric: Metric, value: f64 },

    #[error("Validation failed: {0}")]
    Validation(String),
}
