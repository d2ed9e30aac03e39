//! Shared Postgres plumbing: pool construction, schema bootstrap and
//! SQLx error mapping.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (foreign key violation) | `23503` | `MissingReference` |
//! | Database (check constraint violation) | `23514` | `Constraint` |
//! | Database (other) | any other | `Backend` |
//! | RowNotFound | N/A | `NotFound` |
//! | PoolClosed / other | N/A | `Backend` |

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::instrument;

use super::StoreError;

const SCHEMA: &str = include_str!("schema.sql");

/// Open a connection pool against `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Create the tables if they do not exist yet. Idempotent.
#[instrument(skip(pool), err)]
pub async fn bootstrap(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("bootstrap", e))?;
    tracing::info!("database schema ready");
    Ok(())
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                Some("23503") => StoreError::MissingReference(msg),
                Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Decode failures are backend faults: the schema and the model disagree.
pub(crate) fn decode_error(operation: &str, err: impl core::fmt::Display) -> StoreError {
    StoreError::Backend(format!("failed to decode row in {}: {}", operation, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_eq!(map_sqlx_error("get", sqlx::Error::RowNotFound), StoreError::NotFound);
    }

    #[test]
    fn pool_closed_is_a_backend_failure() {
        let err = map_sqlx_error("list", sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("list")));
    }

    #[test]
    fn schema_declares_store_constraints() {
        assert!(SCHEMA.contains("UNIQUE (event_id, user_id)"));
        assert!(SCHEMA.contains("CHECK (tickets_available >= 0)"));
        assert!(SCHEMA.contains("ON DELETE CASCADE"));
    }
}
