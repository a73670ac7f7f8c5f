//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type AuthResult<T> = Result<T, AuthError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (malformed identifiers,
/// invalid values). Crypto, storage, and delivery failures belong to the
/// crates that own those seams.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AuthError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
