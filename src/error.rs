use thiserror::Error;

/// Failures on the completion request path.
///
/// The `Display` text is what ends up in the conversation as the error turn,
/// so keep it short and readable.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not read the API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CompletionError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
