//! Handlers for the sensor dashboard: current readings, thresholds and
//! chart series.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use terranova_core::error::CoreError;
use terranova_core::metrics::{classify, Metric, SensorStatus};
use terranova_core::series::{ChartSeries, Period};
use terranova_core::thresholds::Threshold;
use terranova_core::types::Timestamp;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One sensor card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorCard {
    pub metric: Metric,
    pub label: &'static str,
    /// Value rounded to display precision.
    pub value: f64,
    pub unit: &'static str,
    /// Value with unit, e.g. `24.3°C`.
    pub formatted: String,
    pub status: SensorStatus,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdsResponse {
    pub thresholds: Vec<Threshold>,
    pub legacy_air_quality: bool,
}

/// Query params for `GET /dashboard/series`.
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub period: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard/readings
pub async fn get_readings(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SensorCard>>>> {
    let snapshot = state.readings.borrow().clone();

    let cards = Metric::ALL
        .into_iter()
        .map(|metric| -> Result<SensorCard, CoreError> {
            let reading = snapshot
                .get(&metric)
                .ok_or(CoreError::MissingReading(metric))?;
            let value = reading.displayed_value();
            Ok(SensorCard {
                metric,
                label: metric.label(),
                value,
                unit: metric.unit(),
                formatted: reading.formatted(),
                status: classify(metric, value),
                timestamp: reading.timestamp,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DataResponse { data: cards }))
}

/// GET /api/v1/dashboard/thresholds
pub async fn get_thresholds(
    State(state): State<AppState>,
) -> Json<DataResponse<ThresholdsResponse>> {
    Json(DataResponse {
        data: ThresholdsResponse {
            thresholds: state.thresholds.iter().copied().collect(),
            legacy_air_quality: state.thresholds.legacy_air_quality(),
        },
    })
}

/// GET /api/v1/dashboard/series?period=24h|7d|30d
///
/// Generates a fresh series for the window; defaults to `24h`.
pub async fn get_series(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> AppResult<Json<DataResponse<ChartSeries>>> {
    let period = match query.period.as_deref() {
        None | Some("") => Period::Day,
        Some(raw) => raw.parse::<Period>()?,
    };

    let series = ChartSeries::generate(period, state.clock.now(), &mut rand::rng());
    Ok(Json(DataResponse { data: series }))
}

/// GET /api/v1/dashboard/series/live
pub async fn get_live_series(State(state): State<AppState>) -> Json<DataResponse<ChartSeries>> {
    let series = state.live_series.read().await.clone();
    Json(DataResponse { data: series })
}
