//! Drives the sensor simulator on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use terranova_events::{DashboardEvent, EventBus};
use tokio_util::sync::CancellationToken;

use crate::state::ReadingsWriter;

/// Run the simulator loop.
///
/// Each tick advances every metric, publishes the snapshot to the readings
/// watch channel and emits `ReadingsUpdated` on the bus. Runs until `cancel`
/// is triggered.
pub async fn run(
    mut writer: ReadingsWriter,
    event_bus: Arc<EventBus>,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = period.as_secs(), "Metrics simulator started");

    let mut rng = StdRng::from_os_rng();
    let mut interval = super::periodic(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Metrics simulator stopping");
                break;
            }
            _ = interval.tick() => {
                let snapshot = writer.tick(&mut rng);
                tracing::trace!(metrics = snapshot.len(), "Readings updated");
                event_bus.publish(DashboardEvent::ReadingsUpdated(snapshot));
            }
        }
    }
}
