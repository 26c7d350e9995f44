//! Route definitions for the chat window endpoints.

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::{chat, upload};
use crate::state::AppState;

/// Root-level chat routes (NOT under `/api/v1`).
///
/// ```text
/// POST /chat      -> chat
/// POST /upload    -> upload (multipart, size-limited)
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route("/chat", post(chat::chat)).route(
        "/upload",
        post(upload::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}
