//! Start/stop lifecycle for the dashboard's background tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::background;
use crate::notifications::FeedRouter;
use crate::state::{AppState, ReadingsWriter};

/// How long [`DashboardRuntime::stop`] waits for each task to finish.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns every periodic dashboard task.
///
/// Dropping the runtime without calling [`stop`](Self::stop) leaves the tasks
/// running until the tokio runtime shuts down.
pub struct DashboardRuntime {
    cancel: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl DashboardRuntime {
    /// Spawn the simulator, evaluator, feed router, sweep, chart refresh and
    /// history sampler tasks, plus the seeded activity notices if enabled.
    pub fn start(state: &AppState, writer: ReadingsWriter) -> Self {
        let cancel = CancellationToken::new();
        let dashboard = &state.config.dashboard;
        let mut handles = Vec::new();

        // Subscribe before anything can publish.
        let router = FeedRouter::new(
            Arc::clone(&state.notifications),
            Arc::clone(&state.activity),
            Arc::clone(&state.event_bus),
            state.clock,
        );
        handles.push((
            "feed_router",
            tokio::spawn(router.run(state.event_bus.subscribe(), cancel.clone())),
        ));

        handles.push((
            "simulator",
            tokio::spawn(background::simulator::run(
                writer,
                Arc::clone(&state.event_bus),
                dashboard.metrics_interval,
                cancel.clone(),
            )),
        ));

        handles.push((
            "evaluator",
            tokio::spawn(background::evaluator::run(
                state.readings.clone(),
                Arc::clone(&state.thresholds),
                Arc::clone(&state.event_bus),
                dashboard.alert_interval,
                cancel.clone(),
            )),
        ));

        handles.push((
            "alert_sweep",
            tokio::spawn(background::alert_sweep::run(
                vec![Arc::clone(&state.notifications), Arc::clone(&state.activity)],
                Arc::clone(&state.event_bus),
                state.clock,
                dashboard.sweep_interval,
                cancel.clone(),
            )),
        ));

        handles.push((
            "chart_refresh",
            tokio::spawn(background::chart_refresh::run(
                Arc::clone(&state.live_series),
                state.clock,
                dashboard.chart_refresh_interval,
                cancel.clone(),
            )),
        ));

        handles.push((
            "history_sampler",
            tokio::spawn(background::history_sampler::run(
                state.readings.clone(),
                Arc::clone(&state.history),
                state.clock,
                dashboard.history_sample_interval,
                cancel.clone(),
            )),
        ));

        if dashboard.seed_activity {
            handles.push((
                "activity",
                tokio::spawn(background::activity::run(
                    Arc::clone(&state.event_bus),
                    cancel.clone(),
                )),
            ));
        }

        tracing::info!(tasks = handles.len(), "Dashboard runtime started");

        Self { cancel, handles }
    }

    /// A token that is cancelled when the runtime stops.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel every task and wait for them to finish.
    pub async fn stop(self) {
        self.cancel.cancel();

        for (name, handle) in self.handles {
            match tokio::time::timeout(STOP_TIMEOUT, handle).await {
                Ok(Ok(())) => tracing::debug!(task = name, "Task stopped"),
                Ok(Err(e)) => tracing::error!(task = name, error = %e, "Task panicked"),
                Err(_) => tracing::warn!(task = name, "Task did not stop in time"),
            }
        }

        tracing::info!("Dashboard runtime stopped");
    }
}
