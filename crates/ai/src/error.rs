//! Chat relay error types.

use thiserror::Error;

/// Failures of a chat exchange.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The message was empty after trimming.
    #[error("{0}")]
    InvalidInput(String),

    /// The backend is not configured, unreachable, or answered with an error.
    #[error("Chat backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend refused to answer for content-policy reasons.
    #[error("Request blocked by content policy: {0}")]
    BlockedContent(String),

    /// The backend answered without any text.
    #[error("Chat backend returned an empty response")]
    EmptyResponse,
}

impl ChatError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// Stable identifier for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::InvalidInput(_) => "INVALID_INPUT",
            ChatError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            ChatError::BlockedContent(_) => "BLOCKED_CONTENT",
            ChatError::EmptyResponse => "EMPTY_RESPONSE",
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::BackendUnavailable(err.to_string())
    }
}
