//! Store and service wiring for the HTTP layer.

use std::sync::Arc;

use anyhow::Context;
use chrono::Duration;

use eventhub_auth::{Hs256JwtIssuer, JwtIssuer};
use eventhub_infra::store::{
    self, InMemoryCredentialStore, InMemoryEventStore, InMemoryRegistrationLedger,
    PostgresCredentialStore, PostgresEventStore, PostgresRegistrationLedger,
};
use eventhub_infra::{
    AccountService, AppConfig, CredentialStore, EventService, EventStore, RegistrationLedger,
};

pub type Events = EventService<Arc<dyn EventStore>, Arc<dyn RegistrationLedger>>;
pub type Accounts = AccountService<Arc<dyn CredentialStore>>;

/// Application services shared by every handler.
pub struct AppServices {
    pub events: Events,
    pub accounts: Accounts,
}

impl AppServices {
    /// Services over fresh in-memory stores.
    pub fn in_memory(issuer: Arc<dyn JwtIssuer>, token_ttl: Duration) -> Self {
        let event_store = Arc::new(InMemoryEventStore::new());
        let ledger: Arc<dyn RegistrationLedger> =
            Arc::new(InMemoryRegistrationLedger::attached_to(&event_store));
        let event_store: Arc<dyn EventStore> = event_store;
        let credentials: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());

        Self {
            events: EventService::new(event_store, ledger),
            accounts: AccountService::new(credentials, issuer, token_ttl),
        }
    }

    /// Services over Postgres; the schema is created if missing.
    pub async fn postgres(
        database_url: &str,
        max_connections: u32,
        issuer: Arc<dyn JwtIssuer>,
        token_ttl: Duration,
    ) -> anyhow::Result<Self> {
        let pool = store::postgres::connect(database_url, max_connections).await?;
        store::postgres::bootstrap(&pool)
            .await
            .context("failed to create database schema")?;

        let event_store: Arc<dyn EventStore> = Arc::new(PostgresEventStore::new(pool.clone()));
        let ledger: Arc<dyn RegistrationLedger> =
            Arc::new(PostgresRegistrationLedger::new(pool.clone()));
        let credentials: Arc<dyn CredentialStore> = Arc::new(PostgresCredentialStore::new(pool));

        Ok(Self {
            events: EventService::new(event_store, ledger),
            accounts: AccountService::new(credentials, issuer, token_ttl),
        })
    }
}

/// Build the services selected by `config` and seed the admin account.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let issuer: Arc<dyn JwtIssuer> = Arc::new(Hs256JwtIssuer::new(config.jwt_secret.as_bytes()));

    let services = match &config.database {
        Some(db) => {
            tracing::info!(max_connections = db.max_connections, "using Postgres stores");
            AppServices::postgres(&db.url, db.max_connections, issuer, config.token_ttl).await?
        }
        None => {
            tracing::info!("using in-memory stores");
            AppServices::in_memory(issuer, config.token_ttl)
        }
    };

    if let Some(admin) = &config.admin {
        services
            .accounts
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("failed to seed admin account")?;
    }

    Ok(services)
}
