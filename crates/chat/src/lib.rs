//! Chat client for the TerraNova assistant.
//!
//! A [`ChatSession`] keeps the transcript shown in the chat window and talks
//! to the server through a [`ChatBackend`]. Failures never escape a session
//! call: they become bot messages in the transcript.

pub mod backend;
pub mod capture;
pub mod error;
pub mod session;
pub mod transcript;

pub use backend::{ChatBackend, HttpChatBackend, ImageUpload};
pub use capture::{Camera, CaptureGuard};
pub use error::{CaptureError, ChatError};
pub use session::ChatSession;
pub use transcript::{EntryBody, Sender, TranscriptEntry};
