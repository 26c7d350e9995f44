//! Handlers for the alert notifications and the activity list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use terranova_core::alert::Alert;
use terranova_core::types::AlertId;
use terranova_events::DashboardEvent;

use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/alerts
///
/// Active transient notifications, newest first.
pub async fn list_notifications(State(state): State<AppState>) -> Json<DataResponse<Vec<Alert>>> {
    let alerts = state.notifications.lock().await.active(state.clock.now());
    Json(DataResponse { data: alerts })
}

/// GET /api/v1/alerts/activity
///
/// The persistent activity list, newest first.
pub async fn list_activity(State(state): State<AppState>) -> Json<DataResponse<Vec<Alert>>> {
    let alerts = state.activity.lock().await.active(state.clock.now());
    Json(DataResponse { data: alerts })
}

/// DELETE /api/v1/alerts/{id}
///
/// Removes the alert from every feed. Dismissing an unknown or already
/// removed alert also returns 204.
pub async fn dismiss(State(state): State<AppState>, Path(id): Path<AlertId>) -> StatusCode {
    let from_notifications = state.notifications.lock().await.dismiss(id).is_some();
    let from_activity = state.activity.lock().await.dismiss(id).is_some();

    if from_notifications || from_activity {
        tracing::debug!(alert_id = %id, "Alert dismissed");
        state
            .event_bus
            .publish(DashboardEvent::AlertDismissed { id });
    }

    StatusCode::NO_CONTENT
}
