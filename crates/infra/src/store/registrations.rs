use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use eventhub_core::{EventId, UserId};
use eventhub_events::Registration;

use super::events::{read, write, InMemoryEventStore, SharedTables};
use super::postgres::{decode_error, map_sqlx_error};
use super::{RegistrationLedger, StoreError};

/// In-memory registration ledger.
///
/// Shares its tables with an [`InMemoryEventStore`]: pairs for unknown
/// events are rejected and deleting an event drops its pairs. The
/// membership test and the insert happen under one write lock, so
/// concurrent registrations for the same pair admit exactly one.
#[derive(Debug, Clone)]
pub struct InMemoryRegistrationLedger {
    tables: SharedTables,
}

impl InMemoryRegistrationLedger {
    pub fn attached_to(events: &InMemoryEventStore) -> Self {
        Self {
            tables: events.tables(),
        }
    }
}

#[async_trait]
impl RegistrationLedger for InMemoryRegistrationLedger {
    async fn insert(&self, event_id: EventId, user_id: UserId) -> Result<Registration, StoreError> {
        let mut tables = write(&self.tables)?;
        if !tables.events.contains_key(&event_id) {
            return Err(StoreError::MissingReference(format!("event {event_id} does not exist")));
        }
        if tables.registrations.contains_key(&(event_id, user_id)) {
            return Err(StoreError::Duplicate(format!(
                "user {user_id} is already registered for event {event_id}"
            )));
        }

        let registration = Registration {
            event_id,
            user_id,
            registered_at: Utc::now(),
        };
        tables
            .registrations
            .insert((event_id, user_id), registration.clone());
        Ok(registration)
    }

    async fn delete(&self, event_id: EventId, user_id: UserId) -> Result<(), StoreError> {
        write(&self.tables)?
            .registrations
            .remove(&(event_id, user_id))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn count(&self, event_id: EventId, user_id: UserId) -> Result<u64, StoreError> {
        let tables = read(&self.tables)?;
        Ok(u64::from(tables.registrations.contains_key(&(event_id, user_id))))
    }
}

/// Postgres-backed registration ledger. Uniqueness comes from
/// `UNIQUE (event_id, user_id)`.
#[derive(Debug, Clone)]
pub struct PostgresRegistrationLedger {
    pool: Arc<PgPool>,
}

impl PostgresRegistrationLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl RegistrationLedger for PostgresRegistrationLedger {
    #[instrument(skip(self), fields(event_id = %event_id, user_id = %user_id), err)]
    async fn insert(&self, event_id: EventId, user_id: UserId) -> Result<Registration, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO registrations (event_id, user_id)
            VALUES ($1, $2)
            RETURNING registered_at
            "#,
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_registration", e))?;

        let registered_at: DateTime<Utc> = row
            .try_get("registered_at")
            .map_err(|e| decode_error("insert_registration", e))?;

        Ok(Registration {
            event_id,
            user_id,
            registered_at,
        })
    }

    #[instrument(skip(self), fields(event_id = %event_id, user_id = %user_id), err)]
    async fn delete(&self, event_id: EventId, user_id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM registrations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id.get())
            .bind(user_id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_registration", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %event_id, user_id = %user_id), err)]
    async fn count(&self, event_id: EventId, user_id: UserId) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_registration", e))?;

        u64::try_from(count).map_err(|e| decode_error("count_registration", e))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use eventhub_events::{EventDetails, TicketCount};

    use super::*;
    use crate::store::EventStore;

    async fn setup() -> (InMemoryEventStore, InMemoryRegistrationLedger, EventId) {
        let events = InMemoryEventStore::new();
        let ledger = InMemoryRegistrationLedger::attached_to(&events);
        let event = events
            .insert(
                UserId::new(1),
                EventDetails {
                    name: "Career fair".to_string(),
                    description: "Meet employers".to_string(),
                    location: "Gym".to_string(),
                    starts_at: Utc.with_ymd_and_hms(2030, 4, 2, 10, 0, 0).unwrap(),
                    image_data: None,
                    color: None,
                    price: None,
                    priority: None,
                    tickets_available: TicketCount::new(50).unwrap(),
                },
            )
            .await
            .unwrap();
        (events, ledger, event.id)
    }

    #[tokio::test]
    async fn second_insert_of_same_pair_is_duplicate() {
        let (_events, ledger, event_id) = setup().await;
        let user = UserId::new(2);

        ledger.insert(event_id, user).await.unwrap();
        assert!(matches!(
            ledger.insert(event_id, user).await,
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(ledger.count(event_id, user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_event_is_a_missing_reference() {
        let (_events, ledger, _) = setup().await;
        assert!(matches!(
            ledger.insert(EventId::new(999), UserId::new(2)).await,
            Err(StoreError::MissingReference(_))
        ));
    }

    #[tokio::test]
    async fn deleting_absent_pair_is_not_found() {
        let (_events, ledger, event_id) = setup().await;
        assert_eq!(
            ledger.delete(event_id, UserId::new(2)).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_event_drops_its_registrations() {
        let (events, ledger, event_id) = setup().await;
        ledger.insert(event_id, UserId::new(2)).await.unwrap();
        ledger.insert(event_id, UserId::new(3)).await.unwrap();

        events.delete(event_id).await.unwrap();

        assert_eq!(ledger.count(event_id, UserId::new(2)).await.unwrap(), 0);
        assert_eq!(ledger.count(event_id, UserId::new(3)).await.unwrap(), 0);
    }
}
