//! Error types for the record store.

use thiserror::Error;

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to a spreadsheet.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No usable access credential. Recoverable only by re-authenticating.
    #[error("Authentication required")]
    AuthRequired,

    /// Network or HTTP-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Referenced sheet name or tab id does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Column index cannot be expressed as a single column letter.
    #[error("Column index out of range: {index} (only columns A-Z are addressable)")]
    ColumnOutOfRange { index: usize },

    /// Caller supplied an argument the store cannot act on.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parse error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for [`StoreError::AuthRequired`].
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// True for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
