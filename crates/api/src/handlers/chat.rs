//! Handler for the chat window's message endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Reply payload for `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// UTC time of the reply, ISO 8601 with microseconds and a `Z` suffix.
    pub timestamp: String,
}

/// POST /chat
///
/// Accepts `{"message": "..."}`. The body is parsed leniently: a missing,
/// malformed or non-object body is treated as an empty message rather than
/// rejected. Always responds 200; generator failures come back as reply text.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Json<ChatReply> {
    let message = extract_message(&body);
    tracing::debug!(chars = message.chars().count(), "Chat message received");

    let reply = state.chat.reply(&message).await;

    Json(ChatReply {
        reply,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

fn extract_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string()
}
