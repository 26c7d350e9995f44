//! Transcript entries shown in the chat window.

use chrono::{DateTime, FixedOffset, Utc};

/// Who an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    Text(String),
    /// A locally selected or captured image.
    Image {
        filename: String,
        content_type: String,
        size: usize,
    },
}

/// One bubble in the transcript, stamped `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub body: EntryBody,
    pub time: String,
}

impl TranscriptEntry {
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            EntryBody::Text(text) => Some(text),
            EntryBody::Image { .. } => None,
        }
    }
}

/// Format an instant as hour:minute in the given offset.
pub fn clock_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M").to_string()
}

/// Format a server timestamp (RFC 3339) as hour:minute in the given offset.
///
/// Returns `None` if the timestamp does not parse.
pub fn server_clock_time(timestamp: &str, offset: FixedOffset) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|t| clock_time(t.with_timezone(&Utc), offset))
}
