//! Handler for chat image uploads.
//!
//! Error bodies are `{"error": "..."}` without a code, which is what the
//! chat client reads.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use terranova_core::uploads::{allowed_file, secure_filename, stored_name};

use crate::state::AppState;

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// URL prefix uploaded files are served under.
pub const UPLOAD_URL_PREFIX: &str = "/static/uploads";

/// Success payload for `POST /upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub message: &'static str,
}

/// An upload rejected with a status and a message.
#[derive(Debug)]
pub struct UploadFailure {
    status: StatusCode,
    message: String,
}

impl UploadFailure {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<MultipartError> for UploadFailure {
    fn from(e: MultipartError) -> Self {
        Self {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for UploadFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// POST /upload
///
/// Multipart form with an `image` file field. The sanitized filename is
/// prefixed with a UTC timestamp and written to the upload directory.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadFailure> {
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue; // ignore unknown fields
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let data = field.bytes().await?;
        image = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) =
        image.ok_or_else(|| UploadFailure::bad_request("No image field in request"))?;

    if filename.is_empty() {
        return Err(UploadFailure::bad_request("No selected file"));
    }
    if !allowed_file(&filename) {
        return Err(UploadFailure::bad_request("File type not allowed"));
    }

    let mut safe = secure_filename(&filename);
    if safe.is_empty() {
        safe = "upload".to_string();
    }
    let save_name = stored_name(Utc::now(), &safe);

    let upload_dir = &state.config.upload_dir;
    let written = async {
        tokio::fs::create_dir_all(upload_dir).await?;
        tokio::fs::write(upload_dir.join(&save_name), &data).await
    }
    .await;

    if let Err(e) = written {
        tracing::error!(error = %e, path = %upload_dir.display(), "Failed to save upload");
        return Err(UploadFailure {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to save upload".to_string(),
        });
    }

    tracing::info!(filename = %save_name, bytes = data.len(), "Image uploaded");

    Ok(Json(UploadResponse {
        url: format!("{UPLOAD_URL_PREFIX}/{save_name}"),
        filename: save_name,
        message: "Upload successful",
    }))
}
