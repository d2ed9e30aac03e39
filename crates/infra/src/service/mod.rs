//! Application services composing the domain rules with the stores.
//!
//! Services contain no transport concerns; they take ids and attributes,
//! consult the stores and return domain values or a [`ServiceError`].

use thiserror::Error;

use eventhub_auth::{PasswordHashError, TokenIssueError};
use eventhub_core::DomainError;

use crate::store::StoreError;

pub mod accounts;
pub mod events;

pub use accounts::{AccountService, Session};
pub use events::EventService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("User already registered for this event")]
    AlreadyRegistered,

    #[error("User is not registered for this event")]
    NotRegistered,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Persistence failed for a reason the caller cannot fix.
    #[error("store failure: {0}")]
    Store(StoreError),

    /// Hashing or token signing failed.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::InvalidCapacity(msg) => ServiceError::InvalidCapacity(msg),
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::Unauthorized(msg) => ServiceError::Unauthorized(msg),
            DomainError::AlreadyRegistered => ServiceError::AlreadyRegistered,
            DomainError::NotRegistered => ServiceError::NotRegistered,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => ServiceError::NotFound("record not found".to_string()),
            other => ServiceError::Store(other),
        }
    }
}

impl From<PasswordHashError> for ServiceError {
    fn from(value: PasswordHashError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

impl From<TokenIssueError> for ServiceError {
    fn from(value: TokenIssueError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_becomes_not_found() {
        assert!(matches!(ServiceError::from(StoreError::NotFound), ServiceError::NotFound(_)));
    }

    #[test]
    fn other_store_errors_are_kept() {
        let err = ServiceError::from(StoreError::Backend("boom".to_string()));
        assert!(matches!(err, ServiceError::Store(StoreError::Backend(_))));
    }

    #[test]
    fn domain_errors_keep_their_kind() {
        assert!(matches!(
            ServiceError::from(DomainError::invalid_capacity("x")),
            ServiceError::InvalidCapacity(_)
        ));
        assert!(matches!(
            ServiceError::from(DomainError::AlreadyRegistered),
            ServiceError::AlreadyRegistered
        ));
        assert!(matches!(
            ServiceError::from(DomainError::not_found("Event 3 does not exist")),
            ServiceError::NotFound(msg) if msg == "Event 3 does not exist"
        ));
        assert!(matches!(
            ServiceError::from(DomainError::unauthorized("no")),
            ServiceError::Unauthorized(msg) if msg == "no"
        ));
    }
}
