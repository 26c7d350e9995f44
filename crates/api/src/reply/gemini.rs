//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ChatTurn, ReplyError, ReplyGenerator, Role};

/// Base URL of the Gemini v1beta REST API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key. Keeping the key out of the URL keeps it out
/// of `reqwest::Error` messages, which end up in chat replies and logs.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Outbound request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reply generator backed by the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ReplyError> {
        Self::with_api_base(DEFAULT_API_BASE, api_key, model)
    }

    /// Build a client against a different API base (proxies, tests).
    pub fn with_api_base(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ReplyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ReplyError> {
        let body = build_request_body(system_prompt, history);

        let response = self
            .client
            .post(self.generate_content_url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(ReplyError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        parse_response(&raw)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

fn build_request_body(system_prompt: &str, history: &[ChatTurn]) -> Value {
    let contents: Vec<Value> = history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::User => "user",
                Role::Model => "model",
            };
            json!({ "role": role, "parts": [{ "text": turn.text }] })
        })
        .collect();

    json!({
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
        "contents": contents,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn parse_response(raw: &str) -> Result<String, ReplyError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|e| ReplyError::InvalidResponse(e.to_string()))?;

    let candidate = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| ReplyError::InvalidResponse("response contained no candidates".into()))?;

    let text = candidate
        .content
        .and_then(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    Ok(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
