//! Appends a historical record from the current readings on an interval.

use std::sync::Arc;
use std::time::Duration;

use terranova_core::history::{HistoricalRecord, HistoryStore};
use terranova_core::metrics::ReadingSnapshot;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;

/// Run the history sampling loop.
pub async fn run(
    readings: watch::Receiver<ReadingSnapshot>,
    history: Arc<RwLock<HistoryStore>>,
    clock: Clock,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = period.as_secs(), "History sampler started");

    let mut interval = super::periodic(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("History sampler stopping");
                break;
            }
            _ = interval.tick() => {
                let snapshot = readings.borrow().clone();
                match HistoricalRecord::from_snapshot(&snapshot, clock.now()) {
                    Ok(record) => {
                        let mut history = history.write().await;
                        history.append(record);
                        tracing::debug!(rows = history.len(), "History sample recorded");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping history sample");
                    }
                }
            }
        }
    }
}
