//! Timestamps that follow tokio's clock.
//!
//! Background tasks are scheduled on `tokio::time`, so alert creation and
//! expiry are stamped from the same source. Under paused time
//! (`tokio::time::pause`) advancing the runtime also advances every
//! timestamp, and expiry can be tested deterministically.

use chrono::Utc;
use terranova_core::types::Timestamp;
use tokio::time::Instant;

/// UTC wall time anchored at construction, advanced by tokio's monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    wall_origin: Timestamp,
    origin: Instant,
}

impl Clock {
    /// Anchor a clock at the current wall time.
    pub fn start() -> Self {
        Self {
            wall_origin: Utc::now(),
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + elapsed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn advances_with_paused_time() {
        let clock = Clock::start();
        let before = clock.now();

        tokio::time::advance(Duration::from_secs(90)).await;

        assert_eq!(clock.now() - before, chrono::Duration::seconds(90));
    }
}
