use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use eventhub_core::{Entity, EventId, UserId};
use eventhub_events::{Event, EventDetails, Registration, TicketCount};

use super::postgres::{decode_error, map_sqlx_error};
use super::{EventStore, StoreError};

/// Rows shared by the in-memory event store and registration ledger, so
/// that deleting an event can drop its registrations and the ledger can
/// reject pairs for unknown events.
#[derive(Debug, Default)]
pub(crate) struct EventTables {
    pub(crate) events: BTreeMap<EventId, Event>,
    pub(crate) registrations: BTreeMap<(EventId, UserId), Registration>,
}

pub(crate) type SharedTables = Arc<RwLock<EventTables>>;

pub(crate) fn read(tables: &SharedTables) -> Result<RwLockReadGuard<'_, EventTables>, StoreError> {
    tables
        .read()
        .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
}

pub(crate) fn write(tables: &SharedTables) -> Result<RwLockWriteGuard<'_, EventTables>, StoreError> {
    tables
        .write()
        .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
}

/// In-memory event store.
///
/// Intended for tests/dev. Ids are assigned from an atomic sequence
/// starting at 1.
#[derive(Debug)]
pub struct InMemoryEventStore {
    tables: SharedTables,
    next_id: AtomicI64,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self {
            tables: SharedTables::default(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn tables(&self) -> SharedTables {
        self.tables.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn get(&self, id: EventId) -> Result<Event, StoreError> {
        read(&self.tables)?
            .events
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        Ok(read(&self.tables)?.events.values().cloned().collect())
    }

    async fn insert(&self, owner: UserId, details: EventDetails) -> Result<Event, StoreError> {
        let id = EventId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let event = Event {
            id,
            owner_id: owner,
            details,
        };
        write(&self.tables)?.events.insert(event.id(), event.clone());
        Ok(event)
    }

    async fn update(&self, id: EventId, details: EventDetails) -> Result<Event, StoreError> {
        let mut tables = write(&self.tables)?;
        let event = tables.events.get_mut(&id).ok_or(StoreError::NotFound)?;
        event.details = details;
        Ok(event.clone())
    }

    async fn update_tickets(&self, id: EventId, count: TicketCount) -> Result<(), StoreError> {
        let mut tables = write(&self.tables)?;
        let event = tables.events.get_mut(&id).ok_or(StoreError::NotFound)?;
        event.details.tickets_available = count;
        Ok(())
    }

    async fn delete(&self, id: EventId) -> Result<(), StoreError> {
        let mut tables = write(&self.tables)?;
        if tables.events.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        tables.registrations.retain(|(event_id, _), _| *event_id != id);
        Ok(())
    }
}

/// Postgres-backed event store.
///
/// Registrations are removed with their event by `ON DELETE CASCADE`.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: Arc<PgPool>,
}

const EVENT_COLUMNS: &str = "id, name, description, location, starts_at, owner_id, \
     image_data, color, price, priority, tickets_available";

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn event_from_row(operation: &str, row: &PgRow) -> Result<Event, StoreError> {
    let decode = |e: sqlx::Error| decode_error(operation, e);

    let tickets: i64 = row.try_get("tickets_available").map_err(decode)?;
    let starts_at: DateTime<Utc> = row.try_get("starts_at").map_err(decode)?;

    Ok(Event {
        id: EventId::new(row.try_get("id").map_err(decode)?),
        owner_id: UserId::new(row.try_get("owner_id").map_err(decode)?),
        details: EventDetails {
            name: row.try_get("name").map_err(decode)?,
            description: row.try_get("description").map_err(decode)?,
            location: row.try_get("location").map_err(decode)?,
            starts_at,
            image_data: row.try_get("image_data").map_err(decode)?,
            color: row.try_get("color").map_err(decode)?,
            price: row.try_get("price").map_err(decode)?,
            priority: row.try_get("priority").map_err(decode)?,
            tickets_available: TicketCount::new(tickets).map_err(|e| decode_error(operation, e))?,
        },
    })
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[instrument(skip(self), fields(event_id = %id), err)]
    async fn get(&self, id: EventId) -> Result<Event, StoreError> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_event", e))?
            .ok_or(StoreError::NotFound)?;
        event_from_row("get_event", &row)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_events", e))?;

        rows.iter().map(|row| event_from_row("list_events", row)).collect()
    }

    #[instrument(skip(self, details), fields(owner_id = %owner), err)]
    async fn insert(&self, owner: UserId, details: EventDetails) -> Result<Event, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO events
                (name, description, location, starts_at, owner_id,
                 image_data, color, price, priority, tickets_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.location)
        .bind(details.starts_at)
        .bind(owner.get())
        .bind(&details.image_data)
        .bind(&details.color)
        .bind(details.price)
        .bind(&details.priority)
        .bind(details.tickets_available.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_event", e))?;

        event_from_row("insert_event", &row)
    }

    #[instrument(skip(self, details), fields(event_id = %id), err)]
    async fn update(&self, id: EventId, details: EventDetails) -> Result<Event, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE events SET
                name = $2, description = $3, location = $4, starts_at = $5,
                image_data = $6, color = $7, price = $8, priority = $9,
                tickets_available = $10
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(&details.name)
        .bind(&details.description)
        .bind(&details.location)
        .bind(details.starts_at)
        .bind(&details.image_data)
        .bind(&details.color)
        .bind(details.price)
        .bind(&details.priority)
        .bind(details.tickets_available.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_event", e))?
        .ok_or(StoreError::NotFound)?;

        event_from_row("update_event", &row)
    }

    #[instrument(skip(self), fields(event_id = %id, tickets = %count), err)]
    async fn update_tickets(&self, id: EventId, count: TicketCount) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE events SET tickets_available = $2 WHERE id = $1")
            .bind(id.get())
            .bind(count.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_tickets", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %id), err)]
    async fn delete(&self, id: EventId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_event", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn details(tickets: i64) -> EventDetails {
        EventDetails {
            name: "Hackathon".to_string(),
            description: "24h of code".to_string(),
            location: "Library".to_string(),
            starts_at: Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap(),
            image_data: None,
            color: None,
            price: None,
            priority: None,
            tickets_available: TicketCount::new(tickets).unwrap(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let store = InMemoryEventStore::new();
        let a = store.insert(UserId::new(1), details(1)).await.unwrap();
        let b = store.insert(UserId::new(1), details(1)).await.unwrap();
        assert_eq!(a.id, EventId::new(1));
        assert_eq!(b.id, EventId::new(2));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_keeps_owner() {
        let store = InMemoryEventStore::new();
        let event = store.insert(UserId::new(3), details(10)).await.unwrap();
        let updated = store.update(event.id, details(4)).await.unwrap();
        assert_eq!(updated.owner_id, UserId::new(3));
        assert_eq!(updated.tickets_available().get(), 4);
    }

    #[tokio::test]
    async fn missing_event_is_not_found() {
        let store = InMemoryEventStore::new();
        let id = EventId::new(42);
        assert_eq!(store.get(id).await, Err(StoreError::NotFound));
        assert_eq!(store.update(id, details(1)).await, Err(StoreError::NotFound));
        assert_eq!(
            store.update_tickets(id, TicketCount::ZERO).await,
            Err(StoreError::NotFound)
        );
        assert_eq!(store.delete(id).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn update_tickets_overwrites_counter() {
        let store = InMemoryEventStore::new();
        let event = store.insert(UserId::new(1), details(10)).await.unwrap();
        store
            .update_tickets(event.id, TicketCount::new(3).unwrap())
            .await
            .unwrap();
        assert_eq!(store.get(event.id).await.unwrap().tickets_available().get(), 3);
    }
}
