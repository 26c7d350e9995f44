//! Alert types raised by threshold violations and farm activity events.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::metrics::Metric;
use crate::types::{AlertId, Timestamp};

/// Severity level of an alert or a sensor indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Warning,
    Danger,
}

/// Why an alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertCause {
    /// The reading is above the metric's upper bound.
    AboveMax,
    /// The reading is below the metric's lower bound.
    BelowMin,
    /// A farm activity notice not tied to a threshold.
    Activity,
}

/// An alert before it has been placed in a feed.
///
/// Feeds assign the id and lifetime when the alert is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub severity: Severity,
    pub metric: Option<Metric>,
    pub cause: AlertCause,
    pub title: String,
    pub message: String,
}

impl NewAlert {
    /// A farm activity notice (harvest finished, pest sighting, ...).
    pub fn activity(
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            metric: None,
            cause: AlertCause::Activity,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Deduplication key: one active alert per metric and cause.
    ///
    /// Activity notices have no key and are never deduplicated.
    pub fn dedup_key(&self) -> Option<(Metric, AlertCause)> {
        self.metric.map(|m| (m, self.cause))
    }
}

/// An alert living in a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub severity: Severity,
    pub metric: Option<Metric>,
    pub cause: AlertCause,
    pub title: String,
    pub message: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl Alert {
    /// Materialize `new` at `now` with the given lifetime.
    ///
    /// `lifetime` must be positive; [`crate::feed::FeedConfig`] enforces this.
    pub fn materialize(new: NewAlert, now: Timestamp, lifetime: Duration) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            severity: new.severity,
            metric: new.metric,
            cause: new.cause,
            title: new.title,
            message: new.message,
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    pub fn dedup_key(&self) -> Option<(Metric, AlertCause)> {
        self.metric.map(|m| (m, self.cause))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn materialized_alert_expires_after_creation() {
        let now = Utc::now();
        let alert = Alert::materialize(
            NewAlert::activity(Severity::Good, "Harvest Complete", "done"),
            now,
            Duration::seconds(10),
        );
        assert!(alert.expires_at > alert.created_at);
        assert!(!alert.is_expired(now + Duration::seconds(9)));
        assert!(alert.is_expired(now + Duration::seconds(10)));
    }

    #[test]
    fn activity_alerts_have_no_dedup_key() {
        let alert = NewAlert::activity(Severity::Warning, "Pest Alert", "Field C");
        assert!(alert.dedup_key().is_none());
    }
}
