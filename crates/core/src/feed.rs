//! Display list of alerts with expiry, dismissal and an optional size cap.
//!
//! The feed is newest-first. Every alert receives a fixed lifetime when it is
//! emitted; [`AlertFeed::active`] never returns an alert at or past its
//! `expires_at`, even before [`AlertFeed::prune`] has physically removed it.
//! With a capacity configured, emitting beyond the cap evicts the oldest
//! alerts by arrival order regardless of severity.
//!
//! The feed itself is not synchronized; callers share it behind a mutex so
//! that no two operations on the same alert interleave.

use std::collections::VecDeque;
use std::time::Duration;

use crate::alert::{Alert, NewAlert};
use crate::error::CoreError;
use crate::types::{AlertId, Timestamp};

/// Default lifetime of a transient notification.
pub const DEFAULT_NOTIFICATION_LIFETIME: Duration = Duration::from_secs(10);

/// Default number of entries kept in the persistent activity list.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 5;

/// Longest lifetime a feed accepts.
const MAX_LIFETIME: Duration = Duration::from_secs(365 * 24 * 3600);

/// Lifetime and capacity policy for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    lifetime: chrono::Duration,
    capacity: Option<usize>,
}

impl FeedConfig {
    /// Build a config. The lifetime must be non-zero and at most a year; the
    /// capacity, if any, must be non-zero.
    pub fn new(lifetime: Duration, capacity: Option<usize>) -> Result<Self, CoreError> {
        if lifetime.is_zero() || lifetime > MAX_LIFETIME {
            return Err(CoreError::Validation(format!(
                "alert lifetime must be non-zero and at most {} days",
                MAX_LIFETIME.as_secs() / 86_400
            )));
        }
        if capacity == Some(0) {
            return Err(CoreError::Validation(
                "feed capacity must be greater than zero".to_string(),
            ));
        }
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|e| CoreError::Validation(format!("invalid alert lifetime: {e}")))?;
        Ok(Self { lifetime, capacity })
    }

    /// Transient notifications: short lifetime, uncapped.
    pub fn notifications() -> Self {
        Self {
            lifetime: chrono::Duration::seconds(DEFAULT_NOTIFICATION_LIFETIME.as_secs() as i64),
            capacity: None,
        }
    }

    pub fn lifetime(&self) -> chrono::Duration {
        self.lifetime
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

/// Result of a successful [`AlertFeed::emit`].
#[derive(Debug, Clone)]
pub struct Emitted {
    /// The alert as stored in the feed.
    pub alert: Alert,
    /// Alerts pushed out by this emit: a less severe alert it superseded,
    /// then any removed by the capacity limit.
    pub evicted: Vec<Alert>,
}

/// An ordered, newest-first list of alerts.
#[derive(Debug)]
pub struct AlertFeed {
    config: FeedConfig,
    alerts: VecDeque<Alert>,
}

impl AlertFeed {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            alerts: VecDeque::new(),
        }
    }

    pub fn config(&self) -> FeedConfig {
        self.config
    }

    /// Insert an alert at the front of the feed.
    ///
    /// At most one unexpired alert per metric and cause is kept. A repeat at
    /// the same or lower severity is dropped and `None` is returned; a more
    /// severe one replaces the displayed alert, which is reported in
    /// [`Emitted::evicted`].
    pub fn emit(&mut self, new: NewAlert, now: Timestamp) -> Option<Emitted> {
        let mut evicted = Vec::new();

        if let Some(key) = new.dedup_key() {
            let existing = self
                .alerts
                .iter()
                .position(|a| !a.is_expired(now) && a.dedup_key() == Some(key));
            if let Some(index) = existing {
                if self.alerts[index].severity >= new.severity {
                    return None;
                }
                evicted.extend(self.alerts.remove(index));
            }
        }

        let alert = Alert::materialize(new, now, self.config.lifetime);
        self.alerts.push_front(alert.clone());

        if let Some(capacity) = self.config.capacity {
            while self.alerts.len() > capacity {
                if let Some(oldest) = self.alerts.pop_back() {
                    evicted.push(oldest);
                }
            }
        }

        Some(Emitted { alert, evicted })
    }

    /// Remove an alert immediately. Removing an absent alert is a no-op.
    pub fn dismiss(&mut self, id: AlertId) -> Option<Alert> {
        let index = self.alerts.iter().position(|a| a.id == id)?;
        self.alerts.remove(index)
    }

    /// Alerts visible at `now`, newest first.
    pub fn active(&self, now: Timestamp) -> Vec<Alert> {
        self.alerts
            .iter()
            .filter(|a| !a.is_expired(now))
            .cloned()
            .collect()
    }

    /// Drop every alert expired at `now` and return them.
    pub fn prune(&mut self, now: Timestamp) -> Vec<Alert> {
        let (expired, kept): (Vec<_>, Vec<_>) =
            self.alerts.drain(..).partition(|a| a.is_expired(now));
        self.alerts = kept.into();
        expired
    }

    /// Number of stored alerts, including expired ones not yet pruned.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;
    use crate::alert::{AlertCause, Severity};
    use crate::metrics::Metric;

    fn activity(title: &str) -> NewAlert {
        NewAlert::activity(Severity::Warning, title, "notice")
    }

    fn high_temperature() -> NewAlert {
        NewAlert {
            severity: Severity::Warning,
            metric: Some(Metric::Temperature),
            cause: AlertCause::AboveMax,
            title: "High Temperature Alert".into(),
            message: "hot".into(),
        }
    }

    fn capped_feed() -> AlertFeed {
        AlertFeed::new(FeedConfig::new(Duration::from_secs(3600), Some(5)).unwrap())
    }

    #[test]
    fn config_rejects_zero_lifetime_and_capacity() {
        assert_matches!(
            FeedConfig::new(Duration::ZERO, None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FeedConfig::new(Duration::from_secs(400 * 24 * 3600), None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FeedConfig::new(Duration::from_secs(1), Some(0)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn emit_inserts_newest_first() {
        let mut feed = AlertFeed::new(FeedConfig::notifications());
        let now = Utc::now();
        feed.emit(activity("first"), now).unwrap();
        feed.emit(activity("second"), now).unwrap();
        let titles: Vec<_> = feed.active(now).into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn sixth_insert_evicts_oldest_by_arrival() {
        let mut feed = capped_feed();
        let now = Utc::now();
        let mut evicted = Vec::new();
        for title in ["A", "B", "C", "D", "E", "F"] {
            let emitted = feed.emit(activity(title), now).unwrap();
            evicted.extend(emitted.evicted);
        }

        let titles: Vec<_> = feed.active(now).into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["F", "E", "D", "C", "B"]);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].title, "A");
        assert_eq!(feed.len(), 5);
    }

    #[test]
    fn capped_feed_never_exceeds_capacity() {
        let mut feed = capped_feed();
        let now = Utc::now();
        for i in 0..20 {
            feed.emit(activity(&format!("n{i}")), now).unwrap();
            assert!(feed.len() <= 5);
        }
    }

    #[test]
    fn expired_alerts_are_hidden_before_prune() {
        let mut feed = AlertFeed::new(FeedConfig::notifications());
        let now = Utc::now();
        let alert = feed.emit(activity("short-lived"), now).unwrap().alert;

        assert!(alert.expires_at > alert.created_at);
        assert_eq!(feed.active(alert.expires_at - chrono::Duration::milliseconds(1)).len(), 1);
        assert!(feed.active(alert.expires_at).is_empty());
        assert!(feed.active(alert.expires_at + chrono::Duration::seconds(60)).is_empty());
        // Still stored until pruned.
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn prune_removes_only_expired() {
        let mut feed = AlertFeed::new(FeedConfig::notifications());
        let start = Utc::now();
        feed.emit(activity("old"), start).unwrap();
        let later = start + chrono::Duration::seconds(5);
        feed.emit(activity("new"), later).unwrap();

        let pruned = feed.prune(start + chrono::Duration::seconds(10));
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].title, "old");
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn dismiss_is_idempotent() {
        let mut feed = AlertFeed::new(FeedConfig::notifications());
        let now = Utc::now();
        let id = feed.emit(activity("x"), now).unwrap().alert.id;

        assert!(feed.dismiss(id).is_some());
        assert!(feed.dismiss(id).is_none());
        assert!(feed.is_empty());
    }

    #[test]
    fn duplicate_metric_cause_is_suppressed_while_active() {
        let mut feed = AlertFeed::new(FeedConfig::notifications());
        let now = Utc::now();
        assert!(feed.emit(high_temperature(), now).is_some());
        assert!(feed.emit(high_temperature(), now + chrono::Duration::seconds(5)).is_none());
        assert_eq!(feed.len(), 1);

        // Once the first one has expired a new alert is allowed again.
        assert!(feed
            .emit(high_temperature(), now + chrono::Duration::seconds(10))
            .is_some());
    }

    #[test]
    fn dismissed_alert_does_not_block_new_one() {
        let mut feed = AlertFeed::new(FeedConfig::notifications());
        let now = Utc::now();
        let id = feed.emit(high_temperature(), now).unwrap().alert.id;
        feed.dismiss(id);
        assert!(feed.emit(high_temperature(), now).is_some());
    }

    #[test]
    fn activity_alerts_are_never_deduplicated() {
        let mut feed = AlertFeed::new(FeedConfig::notifications());
        let now = Utc::now();
        assert!(feed.emit(activity("Pest Alert"), now).is_some());
        assert!(feed.emit(activity("Pest Alert"), now).is_some());
        assert_eq!(feed.len(), 2);
    }

    fn activity_feed() -> AlertFeed {
        AlertFeed::new(FeedConfig::new(Duration::from_secs(24 * 3600), Some(5)).unwrap())
    }

    fn air_quality(severity: Severity, title: &str) -> NewAlert {
        NewAlert {
            severity,
            metric: Some(Metric::AirQuality),
            cause: AlertCause::AboveMax,
            title: title.into(),
            message: "aqi".into(),
        }
    }

    #[test]
    fn escalation_replaces_less_severe_alert() {
        let mut feed = activity_feed();
        let now = Utc::now();
        let moderate = feed
            .emit(air_quality(Severity::Warning, "Moderate Air Quality Alert"), now)
            .unwrap()
            .alert;

        let later = now + chrono::Duration::seconds(10);
        let poor = feed
            .emit(air_quality(Severity::Danger, "Poor Air Quality Alert"), later)
            .expect("danger alert must not be suppressed");

        assert_eq!(poor.evicted.len(), 1);
        assert_eq!(poor.evicted[0].id, moderate.id);
        let active = feed.active(later);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, Severity::Danger);
        assert_eq!(active[0].title, "Poor Air Quality Alert");
    }

    #[test]
    fn de_escalation_is_suppressed() {
        let mut feed = activity_feed();
        let now = Utc::now();
        feed.emit(air_quality(Severity::Danger, "Poor Air Quality Alert"), now)
            .unwrap();

        assert!(feed
            .emit(air_quality(Severity::Warning, "Moderate Air Quality Alert"), now)
            .is_none());
        assert_eq!(feed.active(now)[0].severity, Severity::Danger);
    }
}
