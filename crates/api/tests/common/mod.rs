#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use terranova_api::config::{DashboardConfig, ServerConfig};
use terranova_api::reply::{ChatTurn, ReplyError, ReplyGenerator};
use terranova_api::router::build_app_router;
use terranova_api::state::{AppState, ReadingsWriter};

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "terranova-test-boundary";

/// Smallest valid PNG (1x1, transparent).
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Reply generator that always answers with the same text.
pub struct FixedReply(pub &'static str);

#[async_trait]
impl ReplyGenerator for FixedReply {
    async fn generate(&self, _: &str, _: &[ChatTurn]) -> Result<String, ReplyError> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and no seeded activity notices.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 8 * 1024 * 1024,
        gemini_api_key: None,
        gemini_model: "test-model".to_string(),
        dashboard: DashboardConfig {
            history_backfill: 10,
            seed_activity: false,
            ..DashboardConfig::default()
        },
    }
}

/// Everything a test needs: the router, the state behind it and the temp
/// upload directory (deleted on drop).
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub writer: ReadingsWriter,
    pub upload_dir: TempDir,
}

/// Build the full application router with all middleware layers.
///
/// No background tasks are started; tests drive the state directly.
pub fn build_test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().expect("create temp upload dir");
    let config = test_config(upload_dir.path());
    let (state, writer) =
        AppState::build(config.clone(), Arc::new(FixedReply("hi"))).expect("build state");
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        writer,
        upload_dir,
    }
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body through the router.
pub async fn post_json(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a multipart POST with a single file field.
pub async fn post_file(
    app: Router,
    uri: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, content_type, data)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Encode one file part as a multipart/form-data body.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Collect a response body as bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}
