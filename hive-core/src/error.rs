//! Error types for pipeline operations.

use thiserror::Error;

/// Pipeline operation errors.
///
/// Every operation surfaces a typed error; nothing is silently coerced or
/// auto-corrected. `Conflict` means a state-machine transition was not
/// permitted from the observed state — callers must re-fetch and decide,
/// the pipeline never retries a conflict on its own.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id} not found"))
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
