//! Infrastructure layer: stores, application services and configuration.

pub mod config;
pub mod service;
pub mod store;


pub use config::{AdminSeed, AppConfig, ConfigError, DatabaseConfig};
pub use service::{AccountService, EventService, ServiceError, Session};
pub use store::{CredentialStore, EventStore, RegistrationLedger, StoreError};
