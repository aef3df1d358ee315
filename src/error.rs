//! Error types for promptr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in promptr
#[derive(Debug, Error)]
pub enum PromptrError {
    /// Unrecognized role tag at template construction
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// A placeholder referenced a variable with no binding
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// A '{' was opened but never closed
    #[error("Unclosed placeholder at byte {position}")]
    UnclosedPlaceholder { position: usize },

    /// An empty placeholder '{}' was found
    #[error("Empty placeholder at byte {position}")]
    EmptyPlaceholder { position: usize },

    /// A '}' appeared without a matching '{' (write '}}' for a literal)
    #[error("Unmatched '}}' at byte {position}")]
    UnmatchedClosingBrace { position: usize },

    /// A placeholder name contained characters outside [A-Za-z0-9_]
    #[error("Invalid placeholder name '{name}' at byte {position}")]
    InvalidPlaceholderName { name: String, position: usize },

    /// The upstream stream failed; content aggregated before the failure
    /// is preserved in `partial`
    #[error("Upstream stream error: {message}")]
    UpstreamStream { partial: String, message: String },

    /// API key environment variable not set
    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    /// Non-success response from the chat completion API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SSE event source error
    #[error("Event source error: {0}")]
    EventSource(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PromptrError {
    /// Content aggregated before an upstream stream failure, if any
    pub fn partial_content(&self) -> Option<&str> {
        match self {
            PromptrError::UpstreamStream { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Result type alias for promptr operations
pub type Result<T> = std::result::Result<T, PromptrError>;
