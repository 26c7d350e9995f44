//! Route definitions for historical reports.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET /history        -> list_history (?start, end)
/// GET /export.csv     -> export_csv (?start, end)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history", get(reports::list_history))
        .route("/export.csv", get(reports::export_csv))
}
