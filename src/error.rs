//! Caller-facing error taxonomy
//!
//! Every service operation returns either a well-formed result or exactly one
//! `CoreError`. Generative-service failures never appear here; they are
//! absorbed by the feedback generator.

use crate::storage::StoreError;

/// Errors surfaced by the exercise-session core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed frame input; the frame is rejected and nothing is persisted
    #[error("validation error: {0}")]
    Validation(String),
    /// Unknown session/user, or one the requester may not access
    #[error("not found: {0}")]
    NotFound(String),
    /// Progress window outside the accepted range
    #[error("invalid range: {0}")]
    InvalidRange(String),
    /// Persistence failure; not retried by the core
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Stable machine-readable code used in API error envelopes
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::InvalidRange(_) => "INVALID_RANGE",
            CoreError::Store(_) => "STORE_ERROR",
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
