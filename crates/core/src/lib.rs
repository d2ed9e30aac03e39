//! `eventhub-core`: shared domain building blocks.
//!
//! Identifiers and the domain error model used by every other crate.
//! No IO and no HTTP concerns live here.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EventId, UserId};
