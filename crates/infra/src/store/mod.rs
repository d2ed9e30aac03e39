//! Persistence ports for users, events and registrations.
//!
//! Each port is an async trait with two backends:
//!
//! - in-memory (`RwLock<BTreeMap<..>>`), for dev and tests
//! - Postgres (`sqlx::PgPool`), for persistent deployments
//!
//! Uniqueness of registrations and users is enforced here, by the store,
//! never by a check-then-insert in the caller.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use eventhub_auth::{HashedPassword, NewUser, User};
use eventhub_core::{EventId, UserId};
use eventhub_events::{Event, EventDetails, Registration, TicketCount};

pub mod credentials;
pub mod events;
pub mod postgres;
pub mod registrations;

pub use credentials::{InMemoryCredentialStore, PostgresCredentialStore};
pub use events::{InMemoryEventStore, PostgresEventStore};
pub use registrations::{InMemoryRegistrationLedger, PostgresRegistrationLedger};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// The write referenced a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A check constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Events and their mutable ticket counter.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get(&self, id: EventId) -> Result<Event, StoreError>;

    /// All events, ordered by id.
    async fn list(&self) -> Result<Vec<Event>, StoreError>;

    async fn insert(&self, owner: UserId, details: EventDetails) -> Result<Event, StoreError>;

    /// Replace every mutable attribute. The owner never changes.
    async fn update(&self, id: EventId, details: EventDetails) -> Result<Event, StoreError>;

    /// Overwrite the ticket counter.
    async fn update_tickets(&self, id: EventId, count: TicketCount) -> Result<(), StoreError>;

    /// Delete the event and every registration for it.
    async fn delete(&self, id: EventId) -> Result<(), StoreError>;
}

/// (event, user) registration pairs.
#[async_trait]
pub trait RegistrationLedger: Send + Sync {
    /// Insert a pair. An existing pair yields `StoreError::Duplicate`.
    async fn insert(&self, event_id: EventId, user_id: UserId) -> Result<Registration, StoreError>;

    /// Remove a pair. An absent pair yields `StoreError::NotFound`.
    async fn delete(&self, event_id: EventId, user_id: UserId) -> Result<(), StoreError>;

    async fn count(&self, event_id: EventId, user_id: UserId) -> Result<u64, StoreError>;
}

/// User accounts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. An existing email yields `StoreError::Duplicate`.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn update_password(&self, id: UserId, hash: HashedPassword) -> Result<(), StoreError>;

    /// Create the user as admin, or promote an existing account and reset
    /// its password.
    async fn upsert_admin(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Arc<T> {
    async fn get(&self, id: EventId) -> Result<Event, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        (**self).list().await
    }

    async fn insert(&self, owner: UserId, details: EventDetails) -> Result<Event, StoreError> {
        (**self).insert(owner, details).await
    }

    async fn update(&self, id: EventId, details: EventDetails) -> Result<Event, StoreError> {
        (**self).update(id, details).await
    }

    async fn update_tickets(&self, id: EventId, count: TicketCount) -> Result<(), StoreError> {
        (**self).update_tickets(id, count).await
    }

    async fn delete(&self, id: EventId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<T: RegistrationLedger + ?Sized> RegistrationLedger for Arc<T> {
    async fn insert(&self, event_id: EventId, user_id: UserId) -> Result<Registration, StoreError> {
        (**self).insert(event_id, user_id).await
    }

    async fn delete(&self, event_id: EventId, user_id: UserId) -> Result<(), StoreError> {
        (**self).delete(event_id, user_id).await
    }

    async fn count(&self, event_id: EventId, user_id: UserId) -> Result<u64, StoreError> {
        (**self).count(event_id, user_id).await
    }
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).insert(user).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn update_password(&self, id: UserId, hash: HashedPassword) -> Result<(), StoreError> {
        (**self).update_password(id, hash).await
    }

    async fn upsert_admin(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).upsert_admin(user).await
    }
}
