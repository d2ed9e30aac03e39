//! User credential model.

use serde::{Deserialize, Serialize};

use eventhub_core::{DomainError, DomainResult, UserId};

use crate::{HashedPassword, Role};

/// Minimum accepted password length (characters).
pub const MIN_PASSWORD_LEN: usize = 6;

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: HashedPassword,
    pub role: Role,
}

/// A user account that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: HashedPassword,
    pub role: Role,
}

/// Email + plaintext password, as submitted at signup or login.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"..")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Email in its stored form (trimmed, lowercased).
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    /// Validate for account creation.
    pub fn validate_for_signup(&self) -> DomainResult<()> {
        validate_email(&self.email)?;
        validate_new_password(&self.password)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(())
}

pub fn validate_new_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let creds = Credentials::new("  Alice@Example.COM ", "secret123");
        assert_eq!(creds.normalized_email(), "alice@example.com");
    }

    #[test]
    fn signup_requires_email_with_at_sign() {
        let creds = Credentials::new("alice.example.com", "secret123");
        assert!(matches!(creds.validate_for_signup(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn signup_requires_minimum_password_length() {
        let creds = Credentials::new("alice@example.com", "12345");
        let err = creds.validate_for_signup().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("Password must be at least 6 characters long")
        );
    }

    #[test]
    fn well_formed_credentials_pass() {
        assert!(Credentials::new("alice@example.com", "123456").validate_for_signup().is_ok());
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = Credentials::new("alice@example.com", "hunter22");
        assert!(!format!("{creds:?}").contains("hunter22"));
    }
}
