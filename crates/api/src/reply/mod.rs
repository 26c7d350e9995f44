//! Chat reply generation.
//!
//! [`ChatService`] keeps a bounded in-memory conversation and delegates the
//! actual text generation to a [`ReplyGenerator`]: Gemini when an API key is
//! configured ([`gemini::GeminiClient`]), otherwise a canned offline
//! responder ([`canned::OfflineReplies`]).

pub mod canned;
pub mod gemini;

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Instructions sent ahead of every conversation.
pub const SYSTEM_PROMPT: &str = "\
You are an AI assistant named \"Guru\", created by the TERRA NOVA Team.
Always address the user respectfully as 'Sir', 'Boss' or 'Bhai'.

Rules:
1. Always reply in Hinglish (natural Hindi + English mix).
2. By default keep answers very short (3-7 words), e.g. \"Leaf healthy hai Boss\".
3. If the user asks for details, solutions or a suggestion, give a long,
   structured answer with the disease name, treatment steps and prevention tips.
4. If unsure, say: \"Bhai, mujhe confirm nahi hai, par shayad yeh problem ho sakti hai...\"";

/// Reply text used when the generator returns nothing.
pub const EMPTY_REPLY: &str = "No reply";

/// Number of turns (user and model) kept in the conversation history.
pub const DEFAULT_HISTORY_TURNS: usize = 20;

/// Who said a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// One message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Errors from a reply generator.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("http request failed: {0}")]
    Http(reqwest::Error),

    #[error("generator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid generator response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ReplyError {
    /// Drops the request URL so endpoints and credentials never reach the
    /// reply text or the logs.
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Produces the assistant's next message for a conversation.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Generate a reply; the last entry of `history` is the user's message.
    async fn generate(&self, system_prompt: &str, history: &[ChatTurn])
        -> Result<String, ReplyError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Pick the reply generator for the given configuration.
///
/// Uses Gemini when an API key is set; otherwise, or if the HTTP client
/// cannot be built, falls back to offline replies.
pub fn generator_from_config(config: &ServerConfig) -> Arc<dyn ReplyGenerator> {
    let Some(api_key) = config.gemini_api_key.as_deref() else {
        tracing::warn!("GEMINI_API_KEY not set, chat will use offline replies");
        return Arc::new(canned::OfflineReplies);
    };

    match gemini::GeminiClient::new(api_key, config.gemini_model.clone()) {
        Ok(client) => {
            tracing::info!(model = %config.gemini_model, "Chat replies via Gemini");
            Arc::new(client)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Gemini client, using offline replies");
            Arc::new(canned::OfflineReplies)
        }
    }
}

/// Conversation front-end shared by the `/chat` handler.
pub struct ChatService {
    generator: Arc<dyn ReplyGenerator>,
    history: Mutex<VecDeque<ChatTurn>>,
    max_turns: usize,
}

impl ChatService {
    pub fn new(generator: Arc<dyn ReplyGenerator>) -> Self {
        Self::with_history_limit(generator, DEFAULT_HISTORY_TURNS)
    }

    pub fn with_history_limit(generator: Arc<dyn ReplyGenerator>, max_turns: usize) -> Self {
        Self {
            generator,
            history: Mutex::new(VecDeque::new()),
            max_turns: max_turns.max(2),
        }
    }

    /// Reply to `message`.
    ///
    /// Never fails: generator errors are logged and returned as
    /// `Error: <reason>` so the chat window shows them inline. A failed
    /// exchange leaves no trace in the history.
    pub async fn reply(&self, message: &str) -> String {
        let turn = ChatTurn::user(message);
        let turns: Vec<ChatTurn> = {
            let mut history = self.history.lock().await;
            history.push_back(turn.clone());
            trim_history(&mut history, self.max_turns);
            history.iter().cloned().collect()
        };

        match self.generator.generate(SYSTEM_PROMPT, &turns).await {
            Ok(text) => {
                let text = if text.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    text
                };
                let mut history = self.history.lock().await;
                history.push_back(ChatTurn::model(text.clone()));
                trim_history(&mut history, self.max_turns);
                text
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    generator = self.generator.name(),
                    "Reply generation failed"
                );
                let mut history = self.history.lock().await;
                if let Some(pos) = history.iter().rposition(|t| *t == turn) {
                    history.remove(pos);
                }
                format!("Error: {e}")
            }
        }
    }

    /// Number of turns currently remembered.
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}

/// Drop the oldest turns until at most `max_turns` remain and the history
/// opens with a user turn, so whole exchanges are discarded together.
fn trim_history(history: &mut VecDeque<ChatTurn>, max_turns: usize) {
    while history.len() > max_turns {
        history.pop_front();
    }
    while history.front().is_some_and(|t| t.role == Role::Model) {
        history.pop_front();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
