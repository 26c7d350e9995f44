//! Rolls the live chart series forward.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use terranova_core::series::ChartSeries;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;

/// Run the chart refresh loop: one new point per tick, oldest point dropped.
pub async fn run(
    series: Arc<RwLock<ChartSeries>>,
    clock: Clock,
    period: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = period.as_secs(), "Chart refresh started");

    let mut rng = StdRng::from_os_rng();
    let mut interval = super::periodic(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Chart refresh stopping");
                break;
            }
            _ = interval.tick() => {
                series.write().await.roll(clock.now(), &mut rng);
            }
        }
    }
}
