//! Account lifecycle: signup, login, password change and the admin seed.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};

use eventhub_auth::user::{normalize_email, validate_email, validate_new_password};
use eventhub_auth::{
    hash_password, verify_password, Credentials, JwtClaims, JwtIssuer, NewUser, Role, User,
};
use eventhub_core::{DomainError, UserId};

use crate::store::{CredentialStore, StoreError};

use super::ServiceError;

pub(crate) fn user_not_found(id: UserId) -> ServiceError {
    DomainError::not_found(format!("User {id} does not exist")).into()
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub struct AccountService<C> {
    credentials: C,
    issuer: Arc<dyn JwtIssuer>,
    token_ttl: Duration,
}

impl<C: CredentialStore> AccountService<C> {
    pub fn new(credentials: C, issuer: Arc<dyn JwtIssuer>, token_ttl: Duration) -> Self {
        Self {
            credentials,
            issuer,
            token_ttl,
        }
    }

    /// Create a `user`-role account.
    #[instrument(skip(self, credentials), fields(email = %credentials.normalized_email()))]
    pub async fn signup(&self, credentials: Credentials) -> Result<User, ServiceError> {
        credentials.validate_for_signup()?;

        let new_user = NewUser {
            email: credentials.normalized_email(),
            password_hash: hash_password(&credentials.password)?,
            role: Role::User,
        };

        match self.credentials.insert(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, "user signed up");
                Ok(user)
            }
            Err(StoreError::Duplicate(_)) => Err(ServiceError::EmailTaken),
            Err(other) => Err(other.into()),
        }
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, credentials), fields(email = %credentials.normalized_email()))]
    pub async fn login(&self, credentials: Credentials) -> Result<Session, ServiceError> {
        let user = self
            .credentials
            .find_by_email(&credentials.normalized_email())
            .await?
            .filter(|user| verify_password(&credentials.password, &user.password_hash))
            .ok_or_else(|| {
                warn!("login rejected");
                ServiceError::InvalidCredentials
            })?;

        let claims = JwtClaims::for_user(&user, Utc::now(), self.token_ttl)?;
        let token = self.issuer.issue(&claims)?;
        info!(user_id = %user.id, "login succeeded");
        Ok(Session { token, user })
    }

    pub async fn find_user(&self, id: UserId) -> Result<User, ServiceError> {
        self.credentials
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    #[instrument(skip(self, new_password), fields(user_id = %id))]
    pub async fn change_password(&self, id: UserId, new_password: &str) -> Result<(), ServiceError> {
        validate_new_password(new_password)?;
        let hash = hash_password(new_password)?;

        match self.credentials.update_password(id, hash).await {
            Ok(()) => {
                info!("password updated");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(user_not_found(id)),
            Err(other) => Err(other.into()),
        }
    }

    /// Create or promote the configured admin account.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        validate_email(email)?;
        validate_new_password(password)?;

        let admin = self
            .credentials
            .upsert_admin(NewUser {
                email: normalize_email(email),
                password_hash: hash_password(password)?,
                role: Role::Admin,
            })
            .await?;
        info!(user_id = %admin.id, "admin account ready");
        Ok(admin)
    }
}
