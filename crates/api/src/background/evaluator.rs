//! Periodic threshold evaluation of the latest readings.

use std::sync::Arc;
use std::time::Duration;

use terranova_core::metrics::ReadingSnapshot;
use terranova_core::thresholds::{self, ThresholdTable};
use terranova_events::{DashboardEvent, EventBus};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Run the threshold evaluation loop.
///
/// Reads the latest snapshot on every tick, independently of the simulator
/// cadence, and raises one `AlertRaised` event per violation. A snapshot with
/// missing or non-finite readings skips the tick.
pub async fn run(
    readings: watch::Receiver<ReadingSnapshot>,
    thresholds: Arc<ThresholdTable>,
    event_bus: Arc<EventBus>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = period.as_secs(), "Threshold evaluator started");

    let mut interval = super::periodic(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Threshold evaluator stopping");
                break;
            }
            _ = interval.tick() => {
                let snapshot = readings.borrow().clone();
                match thresholds::evaluate(&snapshot, &thresholds) {
                    Ok(alerts) => {
                        if !alerts.is_empty() {
                            tracing::debug!(count = alerts.len(), "Threshold violations found");
                        }
                        for alert in alerts {
                            event_bus.publish(DashboardEvent::AlertRaised(alert));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping threshold evaluation");
                    }
                }
            }
        }
    }
}
