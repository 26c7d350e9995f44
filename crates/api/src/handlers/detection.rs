//! Handler for the crop disease detection panel.

use axum::extract::Multipart;
use axum::Json;
use terranova_core::detection::{simulate_detection, DetectionResult};

use crate::error::{AppError, AppResult};
use crate::handlers::upload::IMAGE_FIELD;
use crate::response::DataResponse;

/// POST /api/v1/detect
///
/// Accepts a multipart `image` field. The bytes must sniff as PNG, JPEG or
/// GIF; the result itself is simulated.
pub async fn detect(mut multipart: Multipart) -> AppResult<Json<DataResponse<DetectionResult>>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some(data);
            break;
        }
    }

    let data =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'image' field".into()))?;

    let format = image::guess_format(&data)
        .map_err(|_| AppError::BadRequest("Uploaded file is not a recognised image".into()))?;
    if !matches!(
        format,
        image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::Gif
    ) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image format {format:?}. Supported: PNG, JPEG, GIF"
        )));
    }

    let result = simulate_detection(&mut rand::rng());
    tracing::info!(
        ?format,
        crop = %result.crop_type,
        health = ?result.health_status,
        confidence = result.confidence,
        "Detection simulated"
    );

    Ok(Json(DataResponse { data: result }))
}
