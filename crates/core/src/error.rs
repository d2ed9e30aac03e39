//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only (validation, capacity, ownership,
/// ledger state). Persistence failures are modelled by the store layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A ticket capacity was negative.
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller does not own the entity it tries to mutate.
    #[error("{0}")]
    Unauthorized(String),

    /// The (event, user) pair is already present in the ledger.
    #[error("user already registered for this event")]
    AlreadyRegistered,

    /// The (event, user) pair is absent from the ledger.
    #[error("no active registration for this event")]
    NotRegistered,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_capacity(msg: impl Into<String>) -> Self {
        Self::InvalidCapacity(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
