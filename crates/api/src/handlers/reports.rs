//! Handlers for the historical data table and its CSV export.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use terranova_core::history::{self, HistoricalRecord, CSV_FILENAME};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query params for the history and export endpoints.
///
/// Both bounds are optional and inclusive; empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRangeQuery {
    fn bounds(&self) -> AppResult<(Option<NaiveDate>, Option<NaiveDate>)> {
        Ok((
            parse_date("start", self.start.as_deref())?,
            parse_date("end", self.end.as_deref())?,
        ))
    }
}

fn parse_date(name: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::BadRequest(format!("'{name}' must be a date in YYYY-MM-DD format"))
            }),
    }
}

/// GET /api/v1/reports/history?start=&end=
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<DataResponse<Vec<HistoricalRecord>>>> {
    let (start, end) = query.bounds()?;
    let records = state.history.read().await.filter(start, end);
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/reports/export.csv?start=&end=
///
/// Downloads the (optionally filtered) table as `text/csv`.
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<impl IntoResponse> {
    let (start, end) = query.bounds()?;
    let records = state.history.read().await.filter(start, end);
    let body = history::to_csv(&records);

    tracing::debug!(rows = records.len(), "Exporting history as CSV");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        body,
    ))
}
