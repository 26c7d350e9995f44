/// Failure talking to the chat server.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The request never produced a usable HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status, or an upload response
    /// without a URL.
    #[error("server error {status} {status_text}")]
    Server {
        status: u16,
        status_text: String,
        /// `error` or `message` from the response body, if any.
        detail: Option<String>,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ChatError::InvalidResponse(e.to_string())
        } else {
            ChatError::Network(e.to_string())
        }
    }
}

/// Failure acquiring or using the camera.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Permission refused or no device available.
    #[error("{0}")]
    MediaAccessDenied(String),

    /// The device was open but produced no frame.
    #[error("no frame available: {0}")]
    Frame(String),

    #[error("failed to encode photo: {0}")]
    Encode(#[from] image::ImageError),
}
