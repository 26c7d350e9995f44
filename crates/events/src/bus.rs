//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`DashboardEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.
//! Components that only care about one kind of event can register a handler
//! with [`EventBus::on_alert`] or [`EventBus::on_reading_update`].

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use terranova_core::alert::{Alert, NewAlert};
use terranova_core::metrics::ReadingSnapshot;
use terranova_core::types::AlertId;

// ---------------------------------------------------------------------------
// DashboardEvent
// ---------------------------------------------------------------------------

/// Something that happened on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// The simulator published a new set of current readings.
    ReadingsUpdated(ReadingSnapshot),
    /// An alert was raised (threshold violation or farm activity).
    AlertRaised(NewAlert),
    /// An alert was placed in a feed.
    AlertPosted(Alert),
    /// A user dismissed an alert.
    AlertDismissed { id: AlertId },
    /// An alert reached its expiry time or was evicted by the feed cap.
    AlertExpired { id: AlertId },
}

impl DashboardEvent {
    /// Dot-separated event name used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            DashboardEvent::ReadingsUpdated(_) => "readings.updated",
            DashboardEvent::AlertRaised(_) => "alert.raised",
            DashboardEvent::AlertPosted(_) => "alert.posted",
            DashboardEvent::AlertDismissed { .. } => "alert.dismissed",
            DashboardEvent::AlertExpired { .. } => "alert.expired",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`DashboardEvent`].
///
/// # Usage
///
/// ```rust
/// use terranova_events::bus::{DashboardEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DashboardEvent::AlertDismissed { id: uuid::Uuid::nil() });
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: DashboardEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Call `handler` for every raised alert until the bus is dropped.
    ///
    /// For embedding the crate in other services; the API server itself
    /// streams every event to dashboard clients at `/api/v1/ws`.
    pub fn on_alert<F>(&self, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(NewAlert) + Send + 'static,
    {
        self.on_event(move |event| {
            if let DashboardEvent::AlertRaised(alert) = event {
                handler(alert);
            }
        })
    }

    /// Call `handler` for every published reading snapshot until the bus is
    /// dropped.
    pub fn on_reading_update<F>(&self, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(ReadingSnapshot) + Send + 'static,
    {
        self.on_event(move |event| {
            if let DashboardEvent::ReadingsUpdated(readings) = event {
                handler(readings);
            }
        })
    }

    fn on_event<F>(&self, mut handler: F) -> JoinHandle<()>
    where
        F: FnMut(DashboardEvent) + Send + 'static,
    {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => handler(event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use terranova_core::alert::Severity;
    use terranova_core::metrics::{Metric, Reading};

    use super::*;

    fn snapshot() -> ReadingSnapshot {
        let now = Utc::now();
        Metric::ALL
            .into_iter()
            .map(|m| (m, Reading::new(m, 50.0, now)))
            .collect()
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(DashboardEvent::AlertRaised(NewAlert::activity(
            Severity::Good,
            "Harvest Complete",
            "Field A",
        )));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type(), "alert.raised");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DashboardEvent::ReadingsUpdated(snapshot()));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.event_type(), "readings.updated");
        assert_eq!(e2.event_type(), "readings.updated");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(DashboardEvent::AlertExpired {
            id: uuid::Uuid::new_v4(),
        });
    }

    #[tokio::test]
    async fn on_alert_only_sees_raised_alerts() {
        let bus = EventBus::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = bus.on_alert(move |alert| sink.lock().unwrap().push(alert.title));

        bus.publish(DashboardEvent::ReadingsUpdated(snapshot()));
        bus.publish(DashboardEvent::AlertRaised(NewAlert::activity(
            Severity::Warning,
            "Pest Alert",
            "Field C",
        )));
        drop(bus);
        handle.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["Pest Alert".to_string()]);
    }

    #[tokio::test]
    async fn on_reading_update_receives_snapshots() {
        let bus = EventBus::default();
        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);
        let handle = bus.on_reading_update(move |readings| {
            assert_eq!(readings.len(), 4);
            *sink.lock().unwrap() += 1;
        });

        bus.publish(DashboardEvent::ReadingsUpdated(snapshot()));
        bus.publish(DashboardEvent::ReadingsUpdated(snapshot()));
        drop(bus);
        handle.await.unwrap();

        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let id = uuid::Uuid::nil();
        let json = serde_json::to_value(DashboardEvent::AlertDismissed { id }).unwrap();
        assert_eq!(json["type"], "alert_dismissed");
        assert_eq!(json["payload"]["id"], id.to_string());
    }
}
