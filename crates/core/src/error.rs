//! Core error model.

use thiserror::Error;

/// Result type used across the guardian crates for non-authorization failures.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failures that are not authorization decisions.
///
/// Denials are never reported through this type; they are modeled as
/// `DenialCause` in `guardian-auth`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value failed validation (e.g. an empty type key).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
