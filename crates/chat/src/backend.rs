//! Transport to the chat server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ChatError;

/// Multipart field the server reads the image from.
pub const IMAGE_FIELD: &str = "image";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Body of a successful `POST /chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
    /// RFC 3339 UTC time of the reply.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReply {
    pub url: String,
}

/// An image about to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Sends chat messages and image uploads to the server.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError>;

    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReply, ChatError>;
}

/// [`ChatBackend`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChatBackend {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&json!({ "message": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Server {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                detail: None,
            });
        }

        Ok(response.json::<ChatReply>().await?)
    }

    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReply, ChatError> {
        let part = Part::bytes(upload.data.clone())
            .file_name(upload.filename.clone())
            .mime_str(&upload.content_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        let body: Value =
            serde_json::from_str(&raw).map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        interpret_upload(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            &body,
        )
    }
}

/// Turn an upload response into a result.
///
/// Success needs both a 2xx status and a `url`; otherwise the body's `error`
/// (or `message`) becomes the failure detail.
pub fn interpret_upload(
    status: u16,
    status_text: &str,
    body: &Value,
) -> Result<UploadReply, ChatError> {
    let url = body.get("url").and_then(Value::as_str).filter(|u| !u.is_empty());

    match url {
        Some(url) if (200..300).contains(&status) => Ok(UploadReply {
            url: url.to_string(),
        }),
        _ => {
            let detail = ["error", "message"]
                .iter()
                .filter_map(|key| body.get(*key).and_then(Value::as_str))
                .find(|s| !s.is_empty())
                .map(str::to_string);
            Err(ChatError::Server {
                status,
                status_text: status_text.to_string(),
                detail,
            })
        }
    }
}
