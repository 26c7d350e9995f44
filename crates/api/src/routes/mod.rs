pub mod alerts;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod reports;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboard/readings                 current readings with status (GET)
/// /dashboard/thresholds               alert bounds (GET)
/// /dashboard/series                   chart series (?period=24h|7d|30d)
/// /dashboard/series/live              rolling live series (GET)
///
/// /alerts                             active notifications (GET)
/// /alerts/activity                    activity list (GET)
/// /alerts/{id}                        dismiss (DELETE)
///
/// /reports/history                    historical table (?start, end)
/// /reports/export.csv                 CSV download (?start, end)
///
/// /detect                             crop disease detection (POST, multipart)
///
/// /ws                                 live dashboard events (WebSocket)
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/dashboard", dashboard::router())
        .nest("/alerts", alerts::router())
        .nest("/reports", reports::router())
        .route(
            "/detect",
            post(handlers::detection::detect).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/ws", get(ws::ws_handler))
}
