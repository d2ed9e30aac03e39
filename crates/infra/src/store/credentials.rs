use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use eventhub_auth::{HashedPassword, NewUser, Role, User};
use eventhub_core::UserId;

use super::postgres::{decode_error, map_sqlx_error};
use super::{CredentialStore, StoreError};

/// In-memory credential store. Emails are unique.
#[derive(Debug)]
pub struct InMemoryCredentialStore {
    users: RwLock<BTreeMap<UserId, User>>,
    next_id: AtomicI64,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {} is taken", user.email)));
        }

        let id = UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let stored = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(Self::poisoned)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(Self::poisoned)?;
        Ok(users.get(&id).cloned())
    }

    async fn update_password(&self, id: UserId, hash: HashedPassword) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_hash = hash;
        Ok(())
    }

    async fn upsert_admin(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().map_err(Self::poisoned)?;
        if let Some(existing) = users.values_mut().find(|u| u.email == user.email) {
            existing.password_hash = user.password_hash;
            existing.role = Role::Admin;
            return Ok(existing.clone());
        }

        let id = UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let stored = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role: Role::Admin,
        };
        users.insert(id, stored.clone());
        Ok(stored)
    }
}

/// Postgres-backed credential store. Uniqueness comes from the
/// `users.email` unique index.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn user_from_row(operation: &str, row: &PgRow) -> Result<User, StoreError> {
    let decode = |e: sqlx::Error| decode_error(operation, e);

    let role: String = row.try_get("role").map_err(decode)?;
    let hash: String = row.try_get("password_hash").map_err(decode)?;

    Ok(User {
        id: UserId::new(row.try_get("id").map_err(decode)?),
        email: row.try_get("email").map_err(decode)?,
        password_hash: HashedPassword::from_phc(hash),
        role: role.parse().map_err(|e: String| decode_error(operation, e))?,
    })
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self, user), fields(email = %user.email), err)]
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role
            "#,
        )
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .bind(user.role.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        user_from_row("insert_user", &row)
    }

    #[instrument(skip(self), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, email, password_hash, role FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(|r| user_from_row("find_user_by_email", &r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, email, password_hash, role FROM users WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.map(|r| user_from_row("find_user_by_id", &r)).transpose()
    }

    #[instrument(skip(self, hash), fields(user_id = %id), err)]
    async fn update_password(&self, id: UserId, hash: HashedPassword) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id.get())
            .bind(hash.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_password", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, user), fields(email = %user.email), err)]
    async fn upsert_admin(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, 'admin')
            ON CONFLICT (email) DO UPDATE
                SET password_hash = EXCLUDED.password_hash, role = 'admin'
            RETURNING id, email, password_hash, role
            "#,
        )
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_admin", e))?;

        user_from_row("upsert_admin", &row)
    }
}
