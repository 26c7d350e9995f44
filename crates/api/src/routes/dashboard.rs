//! Route definitions for the sensor dashboard.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /readings       -> get_readings
/// GET /thresholds     -> get_thresholds
/// GET /series         -> get_series (?period=24h|7d|30d)
/// GET /series/live    -> get_live_series
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/readings", get(dashboard::get_readings))
        .route("/thresholds", get(dashboard::get_thresholds))
        .route("/series", get(dashboard::get_series))
        .route("/series/live", get(dashboard::get_live_series))
}
