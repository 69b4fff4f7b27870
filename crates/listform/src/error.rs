//! Error types for the form engine

use crate::host::DisplayMode;
use crate::session::SessionState;
use thiserror::Error;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Form engine errors
#[derive(Error, Debug)]
pub enum FormError {
    /// Remote store failure
    #[error("Store error: {0}")]
    Store(#[from] listform_client::ClientError),

    /// Operation not allowed in the session's current state
    #[error("Cannot {action} while session is {state:?}")]
    InvalidState {
        action: &'static str,
        state: SessionState,
    },

    /// Write attempted in a read-only display mode
    #[error("Form is read-only in {0:?} mode")]
    ReadOnly(DisplayMode),

    /// Option key that does not name a selectable value
    #[error("Invalid option key for {field}: {key:?}")]
    InvalidKey { field: &'static str, key: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
