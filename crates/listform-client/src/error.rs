//! Error types for the list-item client

use thiserror::Error;

/// List store client error
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The store answered with a non-success status.
    ///
    /// `message` is the store's own error text when the body carries one,
    /// otherwise the raw body.
    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Connection dropped or response unreadable, with no store status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Item or list not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client configuration is unusable (bad URL, bad token)
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of a store-side failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::NotFound(_) => Some(404),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for list store operations
pub type Result<T> = std::result::Result<T, ClientError>;
