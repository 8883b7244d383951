//! Error types for the dockhub metadata store.

use thiserror::Error;

/// Result type alias for metadata store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during metadata store operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("{0} name required")]
    MissingName(&'static str),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("store changed on disk since it was loaded")]
    Conflict,

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

impl StateError {
    /// True for errors caused by the request rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StateError::MissingName(_) | StateError::NotFound { .. } | StateError::Conflict
        )
    }
}
