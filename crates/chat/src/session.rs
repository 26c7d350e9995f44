//! The chat window's conversation state.

use chrono::{FixedOffset, Local, Utc};
use terranova_core::uploads::is_image_content_type;

use crate::backend::{ChatBackend, ImageUpload};
use crate::capture::{Camera, CaptureGuard, PHOTO_FILENAME};
use crate::error::ChatError;
use crate::transcript::{clock_time, server_clock_time, EntryBody, Sender, TranscriptEntry};

pub const NO_REPLY: &str = "No reply received";
pub const NETWORK_ERROR: &str = "Network error: Could not reach server.";
pub const UPLOAD_NETWORK_ERROR: &str = "Network error during upload.";
pub const NOT_AN_IMAGE: &str = "Please select an image file.";
pub const IMAGE_UPLOADED: &str = "Image uploaded successfully.";
pub const PHOTO_UPLOADED: &str = "Photo uploaded successfully.";

/// A transcript plus the backend it talks to.
///
/// Every operation records its outcome in the transcript; none of them
/// return errors.
pub struct ChatSession<B> {
    backend: B,
    transcript: Vec<TranscriptEntry>,
    offset: FixedOffset,
}

impl<B: ChatBackend> ChatSession<B> {
    /// A session stamping entries in the machine's local offset.
    pub fn new(backend: B) -> Self {
        Self::with_offset(backend, *Local::now().offset())
    }

    pub fn with_offset(backend: B, offset: FixedOffset) -> Self {
        Self {
            backend,
            transcript: Vec::new(),
            offset,
        }
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send a text message.
    ///
    /// Blank input is ignored and returns `false`. Otherwise the user entry
    /// and then the bot reply (or an error notice) are appended.
    pub async fn send_text(&mut self, input: &str) -> bool {
        let text = input.trim();
        if text.is_empty() {
            return false;
        }

        self.push(Sender::User, EntryBody::Text(text.to_string()), None);

        match self.backend.send_message(text).await {
            Ok(reply) => {
                let time = reply
                    .timestamp
                    .as_deref()
                    .and_then(|ts| server_clock_time(ts, self.offset));
                let body = reply
                    .reply
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| NO_REPLY.to_string());
                self.push(Sender::Bot, EntryBody::Text(body), time);
            }
            Err(ChatError::Server { status_text, .. }) => {
                self.bot_says(format!("Server error: {status_text}"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.bot_says(NETWORK_ERROR);
            }
        }

        true
    }

    /// Upload a user-selected image.
    ///
    /// Non-image content types are rejected before any network call.
    pub async fn send_image(&mut self, upload: ImageUpload) {
        if !is_image_content_type(&upload.content_type) {
            self.bot_says(NOT_AN_IMAGE);
            return;
        }
        self.upload(upload, IMAGE_UPLOADED).await;
    }

    /// Capture a photo from `camera` and upload it as `photo.jpg`.
    ///
    /// The camera is released on every path, including failures.
    pub async fn capture_photo<C: Camera + ?Sized>(&mut self, camera: &mut C) {
        let mut guard = match CaptureGuard::open(camera) {
            Ok(guard) => guard,
            Err(e) => {
                tracing::warn!(error = %e, "Camera unavailable");
                self.bot_says(format!("Cannot access camera: {e}"));
                return;
            }
        };

        let data = match guard.capture_jpeg() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "Photo capture failed");
                self.bot_says(format!("Cannot capture photo: {e}"));
                return;
            }
        };

        let upload = ImageUpload {
            filename: PHOTO_FILENAME.to_string(),
            content_type: "image/jpeg".to_string(),
            data,
        };
        self.upload(upload, PHOTO_UPLOADED).await;
        drop(guard);
    }

    async fn upload(&mut self, upload: ImageUpload, success: &str) {
        self.push(
            Sender::User,
            EntryBody::Image {
                filename: upload.filename.clone(),
                content_type: upload.content_type.clone(),
                size: upload.data.len(),
            },
            None,
        );

        match self.backend.upload_image(&upload).await {
            Ok(reply) => {
                tracing::debug!(url = %reply.url, "Image uploaded");
                self.bot_says(success);
            }
            Err(ChatError::Server { detail, .. }) => {
                let detail = detail.unwrap_or_else(|| "unknown".to_string());
                self.bot_says(format!("Upload failed: {detail}"));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upload request failed");
                self.bot_says(UPLOAD_NETWORK_ERROR);
            }
        }
    }

    fn bot_says(&mut self, text: impl Into<String>) {
        self.push(Sender::Bot, EntryBody::Text(text.into()), None);
    }

    fn push(&mut self, sender: Sender, body: EntryBody, time: Option<String>) {
        let time = time.unwrap_or_else(|| clock_time(Utc::now(), self.offset));
        self.transcript.push(TranscriptEntry { sender, body, time });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
