/// Alerts are keyed by random UUIDs; nothing is persisted.
pub type AlertId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
