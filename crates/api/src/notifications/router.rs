//! Event-to-feed routing engine.
//!
//! [`FeedRouter`] subscribes to the event bus and places every raised alert
//! into the feeds that display it: threshold alerts go to both the transient
//! notifications and the activity list; farm activity notices only to the
//! activity list.

use std::sync::Arc;

use terranova_core::alert::{AlertCause, NewAlert};
use terranova_events::{DashboardEvent, EventBus};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::state::SharedFeed;

/// Routes raised alerts into the notification and activity feeds.
pub struct FeedRouter {
    notifications: SharedFeed,
    activity: SharedFeed,
    event_bus: Arc<EventBus>,
    clock: Clock,
}

impl FeedRouter {
    pub fn new(
        notifications: SharedFeed,
        activity: SharedFeed,
        event_bus: Arc<EventBus>,
        clock: Clock,
    ) -> Self {
        Self {
            notifications,
            activity,
            event_bus,
            clock,
        }
    }

    /// Run the main routing loop.
    ///
    /// Exits when `cancel` is triggered or the channel is closed.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<DashboardEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Feed router stopping");
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(DashboardEvent::AlertRaised(alert)) => self.route(alert).await,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Feed router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, feed router shutting down");
                    break;
                }
            }
        }
    }

    /// Emit one alert into every feed that shows it.
    pub async fn route(&self, alert: NewAlert) {
        if alert.cause != AlertCause::Activity {
            self.emit_into(&self.notifications, alert.clone(), "notifications")
                .await;
        }
        self.emit_into(&self.activity, alert, "activity").await;
    }

    async fn emit_into(&self, feed: &SharedFeed, alert: NewAlert, feed_name: &'static str) {
        let emitted = feed.lock().await.emit(alert, self.clock.now());

        let Some(emitted) = emitted else {
            tracing::trace!(feed = feed_name, "Duplicate alert suppressed");
            return;
        };

        tracing::debug!(
            feed = feed_name,
            alert_id = %emitted.alert.id,
            severity = ?emitted.alert.severity,
            title = %emitted.alert.title,
            "Alert posted"
        );
        for evicted in emitted.evicted {
            self.event_bus
                .publish(DashboardEvent::AlertExpired { id: evicted.id });
        }
        self.event_bus
            .publish(DashboardEvent::AlertPosted(emitted.alert));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
