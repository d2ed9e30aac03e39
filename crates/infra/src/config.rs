//! Configuration loading and representation.
//!
//! Plain environment variables; `from_lookup` takes any key lookup so tests
//! do not have to mutate the process environment.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use eventhub_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_SECRET: &str = "dev-secret";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;
/// One year.
const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Seed account promoted to `admin` at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"..")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// `None` selects the in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub admin: Option<AdminSeed>,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"..")
            .field("token_ttl", &self.token_ttl)
            .field("database", &self.database.as_ref().map(|db| db.max_connections))
            .field("admin", &self.admin)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Whether tokens are signed with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDR", e.to_string()))?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let ttl_minutes = match get("TOKEN_TTL_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|e| invalid("TOKEN_TTL_MINUTES", e.to_string()))?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(invalid(
                "TOKEN_TTL_MINUTES",
                format!("must be between 1 and {MAX_TOKEN_TTL_MINUTES} minutes"),
            ));
        }
        let token_ttl = Duration::try_minutes(ttl_minutes)
            .ok_or_else(|| invalid("TOKEN_TTL_MINUTES", "out of range"))?;

        let persistent = match get("USE_PERSISTENT_STORES") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid("USE_PERSISTENT_STORES", format!("expected true or false, got '{raw}'"))
            })?,
            None => false,
        };

        let database = if persistent {
            let url = get("DATABASE_URL").ok_or_else(|| {
                invalid("DATABASE_URL", "required when USE_PERSISTENT_STORES is true")
            })?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("DATABASE_MAX_CONNECTIONS", "must be a positive integer"))?,
                None => DEFAULT_MAX_CONNECTIONS,
            };
            Some(DatabaseConfig { url, max_connections })
        } else {
            None
        };

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(invalid("ADMIN_PASSWORD", "required with ADMIN_EMAIL")),
            (None, Some(_)) => return Err(invalid("ADMIN_EMAIL", "required with ADMIN_PASSWORD")),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| invalid("LOG_FORMAT", e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            database,
            admin,
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_select_in_memory_stores() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(config.uses_dev_secret());
        assert_eq!(config.token_ttl, Duration::hours(2));
        assert_eq!(config.database, None);
        assert_eq!(config.admin, None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn persistent_stores_require_database_url() {
        let err = load(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_URL", .. }));
    }

    #[test]
    fn persistent_stores_use_pool_size() {
        let config = load(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/eventhub"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();
        assert_eq!(
            config.database,
            Some(DatabaseConfig {
                url: "postgres://localhost/eventhub".to_string(),
                max_connections: 4,
            })
        );
    }

    #[test]
    fn admin_seed_needs_both_values() {
        assert!(load(&[("ADMIN_EMAIL", "admin@email.com")]).is_err());
        let config = load(&[("ADMIN_EMAIL", "admin@email.com"), ("ADMIN_PASSWORD", "admin123")]).unwrap();
        assert_eq!(config.admin.map(|a| a.email), Some("admin@email.com".to_string()));
    }

    #[test]
    fn malformed_values_name_their_key() {
        assert!(matches!(
            load(&[("TOKEN_TTL_MINUTES", "soon")]).unwrap_err(),
            ConfigError::Invalid { key: "TOKEN_TTL_MINUTES", .. }
        ));
        assert!(matches!(
            load(&[("BIND_ADDR", "nowhere")]).unwrap_err(),
            ConfigError::Invalid { key: "BIND_ADDR", .. }
        ));
        assert!(matches!(
            load(&[("LOG_FORMAT", "xml")]).unwrap_err(),
            ConfigError::Invalid { key: "LOG_FORMAT", .. }
        ));
    }

    #[test]
    fn token_ttl_is_bounded() {
        let max = i64::MAX.to_string();
        for raw in ["0", "-5", "525601", "100000000000000", max.as_str()] {
            assert!(
                matches!(
                    load(&[("TOKEN_TTL_MINUTES", raw)]).unwrap_err(),
                    ConfigError::Invalid { key: "TOKEN_TTL_MINUTES", .. }
                ),
                "accepted TOKEN_TTL_MINUTES={raw}"
            );
        }
        let config = load(&[("TOKEN_TTL_MINUTES", "525600")]).unwrap();
        assert_eq!(config.token_ttl, Duration::days(365));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&[
            ("JWT_SECRET", "super-secret-key"),
            ("ADMIN_EMAIL", "admin@email.com"),
            ("ADMIN_PASSWORD", "admin-pass"),
        ])
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(!rendered.contains("admin-pass"));
    }
}
