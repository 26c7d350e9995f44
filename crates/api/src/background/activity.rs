//! Demo farm activity notices posted shortly after startup.

use std::sync::Arc;
use std::time::Duration;

use terranova_core::alert::{NewAlert, Severity};
use terranova_events::{DashboardEvent, EventBus};
use tokio_util::sync::CancellationToken;

/// Notices raised after startup, each with its delay from startup.
const SEEDED: [(u64, Severity, &str, &str); 2] = [
    (
        10,
        Severity::Good,
        "Harvest Complete",
        "Field A tomatoes have been successfully harvested.",
    ),
    (
        20,
        Severity::Warning,
        "Pest Alert",
        "Unusual activity detected in Field C. Please inspect.",
    ),
];

/// Raise the seeded activity notices, then return.
pub async fn run(event_bus: Arc<EventBus>, cancel: CancellationToken) {
    let start = tokio::time::Instant::now();

    for (delay_secs, severity, title, message) in SEEDED {
        let deadline = start + Duration::from_secs(delay_secs);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep_until(deadline) => {
                tracing::info!(title, "Posting farm activity notice");
                event_bus.publish(DashboardEvent::AlertRaised(NewAlert::activity(
                    severity, title, message,
                )));
            }
        }
    }
}
