//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic domain failures (validation, unknown
/// registry values). Access-control *decisions* are values, not errors:
/// denials and failed sanitization resolve to redirects, never to `Err`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A role string outside the closed registry.
    #[error("unknown role: {0:?}")]
    UnknownRole(String),

    /// A feature string outside the closed registry.
    #[error("unknown feature: {0:?}")]
    UnknownFeature(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_role(value: impl Into<String>) -> Self {
        Self::UnknownRole(value.into())
    }

    pub fn unknown_feature(value: impl Into<String>) -> Self {
        Self::UnknownFeature(value.into())
    }
}
