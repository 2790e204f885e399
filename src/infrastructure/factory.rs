//! Store construction for runtime backend selection.
//!
//! # Example
//!
//! ```ignore
//! let config = AppConfig::from_env()?;
//! let store = StoreFactory::new(config.storage_mode, config.database).create().await?;
//! let state = AppState::new(store);
//! ```

use std::sync::Arc;

use thiserror::Error;

use super::config::{DatabaseConfig, StorageMode};
use super::{AccountStore, InMemoryAccountStore, PostgresAccountStore};

/// Errors that can occur while bringing a store up.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The first connection to the database could not be opened.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// The database rejected the statement query.
    #[error("Statement preparation error: {0}")]
    StatementPreparation(String),
}

/// Builds the configured [`AccountStore`].
#[derive(Debug, Clone)]
pub struct StoreFactory {
    storage_mode: StorageMode,
    database: DatabaseConfig,
}

impl StoreFactory {
    #[must_use]
    pub const fn new(storage_mode: StorageMode, database: DatabaseConfig) -> Self {
        Self {
            storage_mode,
            database,
        }
    }

    /// Creates the store.
    ///
    /// In `postgres` mode this opens the pool and prepares the statement
    /// query; either failing aborts startup.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` when the database is unreachable or rejects the
    /// statement query.
    pub async fn create(&self) -> Result<Arc<dyn AccountStore>, FactoryError> {
        match self.storage_mode {
            StorageMode::InMemory => Ok(Arc::new(InMemoryAccountStore::seeded())),
            StorageMode::Postgres => {
                let store = self.create_postgres_store().await?;
                Ok(Arc::new(store))
            }
        }
    }

    async fn create_postgres_store(&self) -> Result<PostgresAccountStore, FactoryError> {
        tracing::info!(
            host = %self.database.host,
            port = self.database.port,
            database = %self.database.name,
            ssl_mode = ?self.database.ssl_mode,
            max_connections = self.database.max_connections,
            "Connecting to PostgreSQL"
        );

        let store = PostgresAccountStore::connect(&self.database)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))?;

        store
            .prepare()
            .await
            .map_err(|error| FactoryError::StatementPreparation(error.to_string()))?;

        Ok(store)
    }
}
