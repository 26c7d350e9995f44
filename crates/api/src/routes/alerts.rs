//! Route definitions for alerts.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /            -> list_notifications
/// GET    /activity    -> list_activity
/// DELETE /{id}        -> dismiss
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_notifications))
        .route("/activity", get(alerts::list_activity))
        .route("/{id}", delete(alerts::dismiss))
}
