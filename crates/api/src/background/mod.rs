//! Background tasks and scheduled jobs.
//!
//! Each submodule provides a long-running async function intended to be
//! spawned via `tokio::spawn`. All tasks accept a [`CancellationToken`]
//! for graceful shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod activity;
pub mod alert_sweep;
pub mod chart_refresh;
pub mod evaluator;
pub mod history_sampler;
pub mod simulator;

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// An interval whose first tick fires one full `period` from now.
///
/// Missed ticks are delayed rather than bursted, so a stalled tick body
/// never causes a catch-up storm.
pub(crate) fn periodic(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
