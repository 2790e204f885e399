//! Application configuration.
//!
//! Everything is read from environment variables once at startup; every key
//! is optional and falls back to a default. A `.env` file is honoured when
//! present.
//!
//! # Environment Variables
//!
//! - `HOST`: listen address (default: `0.0.0.0`)
//! - `PORT`: listen port (default: `8080`)
//! - `STORAGE_MODE`: `postgres` (default) | `in_memory`
//! - `WORKER_THREADS`: tokio worker threads (default: logical CPU count)
//! - `DB_HOST`: database host (default: `localhost`)
//! - `DB_PORT`: database port (default: `5432`)
//! - `DB_USER`, `DB_PASSWORD`, `DB_NAME`: credentials and database (default: `postgres`)
//! - `DB_SSLMODE`: `disable` (default) | `allow` | `prefer` | `require` | `verify-ca` | `verify-full`
//! - `DB_POOL_SIZE`: maximum pooled connections (default: `10`)

use std::env;
use std::fmt;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A variable is set but its value cannot be used.
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Unknown storage backend.
    #[error("Invalid storage mode: '{0}'. Expected 'postgres' or 'in_memory'")]
    InvalidStorageMode(String),
}

// =============================================================================
// Storage Mode
// =============================================================================

/// Which [`AccountStore`](super::AccountStore) backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// `PostgreSQL` with the `process_transaction` procedure installed.
    #[default]
    Postgres,
    /// Process-local store seeded with the reference accounts.
    InMemory,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

/// Connection parameters for `PostgreSQL`.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: SslMode,
    /// Upper bound of the connection pool.
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Builds sqlx connection options from these parameters.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(self.ssl_mode.into())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "postgres".to_string(),
            ssl_mode: SslMode::Disable,
            max_connections: 10,
        }
    }
}

// The password stays out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// TLS mode of the database connection, in libpq spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    #[default]
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl FromStr for SslMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "allow" => Ok(Self::Allow),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCa),
            "verify-full" => Ok(Self::VerifyFull),
            _ => Err(ConfigurationError::InvalidValue {
                key: "DB_SSLMODE",
                value: value.to_string(),
                reason: "expected disable, allow, prefer, require, verify-ca or verify-full"
                    .to_string(),
            }),
        }
    }
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => Self::Disable,
            SslMode::Allow => Self::Allow,
            SslMode::Prefer => Self::Prefer,
            SslMode::Require => Self::Require,
            SslMode::VerifyCa => Self::VerifyCa,
            SslMode::VerifyFull => Self::VerifyFull,
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Store backend.
    pub storage_mode: StorageMode,
    /// Tokio worker threads; `None` keeps tokio's default.
    pub worker_threads: Option<usize>,
    /// Database connection parameters (unused in `in_memory` mode).
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            storage_mode: StorageMode::default(),
            worker_threads: None,
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| {
            env::var_os(key).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Loads the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` when a key maps to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let database_defaults = DatabaseConfig::default();

        let storage_mode = match lookup("STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => defaults.storage_mode,
        };
        let ssl_mode = match lookup("DB_SSLMODE") {
            Some(value) => value.parse()?,
            None => database_defaults.ssl_mode,
        };
        let worker_threads = match lookup("WORKER_THREADS") {
            Some(value) => Some(parse_positive("WORKER_THREADS", &value)?),
            None => None,
        };

        let database = DatabaseConfig {
            host: lookup("DB_HOST").unwrap_or(database_defaults.host),
            port: parse_or("DB_PORT", &lookup, database_defaults.port)?,
            user: lookup("DB_USER").unwrap_or(database_defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(database_defaults.password),
            name: lookup("DB_NAME").unwrap_or(database_defaults.name),
            ssl_mode,
            max_connections: match lookup("DB_POOL_SIZE") {
                Some(value) => parse_positive("DB_POOL_SIZE", &value)?,
                None => database_defaults.max_connections,
            },
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", &lookup, defaults.port)?,
            storage_mode,
            worker_threads,
            database,
        })
    }

    /// The `host:port` string the listener binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(key: &'static str, lookup: &F, default: T) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|error: T::Err| ConfigurationError::InvalidValue {
                key,
                value: value.clone(),
                reason: error.to_string(),
            })
    })
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, ConfigurationError>
where
    T: FromStr + Default + PartialEq,
    T::Err: fmt::Display,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|error: T::Err| ConfigurationError::InvalidValue {
            key,
            value: value.to_string(),
            reason: error.to_string(),
        })?;
    if parsed == T::default() {
        return Err(ConfigurationError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(parsed)
}

// =============================================================================
// Tests
// =============================================================================
