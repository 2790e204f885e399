//! Infrastructure: configuration and the account store backends.

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod store;

pub use config::{AppConfig, ConfigurationError, DatabaseConfig, SslMode, StorageMode};
pub use factory::{FactoryError, StoreFactory};
pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
pub use store::{AccountStore, StoreError, classify_sqlstate};
