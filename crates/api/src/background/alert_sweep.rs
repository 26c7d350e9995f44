//! Removes expired alerts from the feeds.

use std::sync::Arc;
use std::time::Duration;

use terranova_events::{DashboardEvent, EventBus};
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::state::SharedFeed;

/// Run the expiry sweep loop.
///
/// Prunes every feed on each tick and publishes `AlertExpired` for each
/// removed alert.
pub async fn run(
    feeds: Vec<SharedFeed>,
    event_bus: Arc<EventBus>,
    clock: Clock,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_ms = period.as_millis() as u64,
        feeds = feeds.len(),
        "Alert sweep started"
    );

    let mut interval = super::periodic(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Alert sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let now = clock.now();
                for feed in &feeds {
                    let expired = feed.lock().await.prune(now);
                    for alert in expired {
                        tracing::debug!(alert_id = %alert.id, title = %alert.title, "Alert expired");
                        event_bus.publish(DashboardEvent::AlertExpired { id: alert.id });
                    }
                }
            }
        }
    }
}
