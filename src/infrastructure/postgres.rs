//! `PostgreSQL` implementation of [`AccountStore`].
//!
//! The database does the real work: the statement document is assembled by
//! `json_build_object` and balance changes go through the
//! `process_transaction` procedure, which locks the account row, enforces the
//! limit and returns the receipt. Both results come back as JSON text and are
//! handed to the HTTP layer without being decoded.
//!
//! # Table Schema
//!
//! See `sql/init.sql`:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id      SERIAL PRIMARY KEY,
//!     "limit" INTEGER NOT NULL,
//!     balance INTEGER NOT NULL DEFAULT 0
//! );
//!
//! CREATE TABLE transactions (
//!     id          SERIAL PRIMARY KEY,
//!     account_id  INTEGER NOT NULL REFERENCES accounts (id),
//!     amount      INTEGER NOT NULL,
//!     kind        CHAR(1) NOT NULL,
//!     description VARCHAR(10) NOT NULL,
//!     created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use bytes::Bytes;
use futures::future::BoxFuture;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

use super::config::DatabaseConfig;
use super::store::{AccountStore, StoreError, classify_sqlstate};
use crate::domain::{AccountId, NewTransaction};

/// Statement document of one account; no row when the account is unknown.
pub const STATEMENT_QUERY: &str = r#"
SELECT json_build_object(
    'balance', json_build_object(
        'total', accounts.balance,
        'date', NOW(),
        'limit', accounts."limit"
    ),
    'recent_transactions', COALESCE((
        SELECT json_agg(json_build_object(
            'amount', recent.amount,
            'kind', recent.kind,
            'description', recent.description,
            'created_at', recent.created_at
        ) ORDER BY recent.created_at DESC, recent.id DESC)
        FROM (
            SELECT id, amount, kind, description, created_at
            FROM transactions
            WHERE account_id = accounts.id
            ORDER BY created_at DESC, id DESC
            LIMIT 10
        ) AS recent
    ), '[]'::json)
)::text
FROM accounts
WHERE accounts.id = $1
"#;

/// Balance update; arguments are `(account_id, amount, description, kind)`.
pub const PROCESS_TRANSACTION_QUERY: &str = "SELECT process_transaction($1, $2, $3, $4)::text";

/// Maps a sqlx error into the store taxonomy.
///
/// Database errors are classified by SQLSTATE, a missing row means the
/// account does not exist, and everything else (I/O, pool timeout, protocol)
/// is a plain database failure.
pub fn classify_database_error(error: &sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::RowNotFound => StoreError::NotFound(error.to_string()),
        sqlx::Error::Database(database_error) => match database_error.code() {
            Some(code) => classify_sqlstate(&code, database_error.message()),
            None => StoreError::Database(database_error.message().to_string()),
        },
        other => StoreError::Database(other.to_string()),
    }
}

// =============================================================================
// PostgreSQL Account Store
// =============================================================================

/// Account store backed by a `PostgreSQL` connection pool.
///
/// # Example
///
/// ```ignore
/// let store = PostgresAccountStore::connect(&DatabaseConfig::default()).await?;
/// store.prepare().await?;
/// let statement = store.fetch_statement(AccountId::new(1)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool with the given parameters.
    ///
    /// One connection is established eagerly, so unreachable hosts and bad
    /// credentials surface here rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns the sqlx error when the first connection cannot be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options())
            .await?;
        Ok(Self::new(pool))
    }

    /// Prepares the statement query on one pooled connection.
    ///
    /// sqlx keeps prepared statements in a per-connection cache, so every
    /// later execution reuses the server-side plan. Running this at startup
    /// fails fast when the schema does not match the query.
    ///
    /// # Errors
    ///
    /// Returns the sqlx error when no connection is available or the server
    /// rejects the query.
    pub async fn prepare(&self) -> Result<(), sqlx::Error> {
        let mut connection = self.pool.acquire().await?;
        (&mut *connection).prepare(STATEMENT_QUERY).await?;
        Ok(())
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl AccountStore for PostgresAccountStore {
    fn fetch_statement(&self, account_id: AccountId) -> BoxFuture<'_, Result<Bytes, StoreError>> {
        Box::pin(async move {
            let document: Option<String> = sqlx::query_scalar(STATEMENT_QUERY)
                .bind(account_id.value())
                .fetch_optional(&self.pool)
                .await
                .map_err(|error| classify_database_error(&error))?;

            document
                .map(Bytes::from)
                .ok_or_else(|| StoreError::NotFound(format!("account {account_id}")))
        })
    }

    fn apply_transaction(
        &self,
        account_id: AccountId,
        transaction: NewTransaction,
    ) -> BoxFuture<'_, Result<Bytes, StoreError>> {
        Box::pin(async move {
            let mut database_transaction = self
                .pool
                .begin()
                .await
                .map_err(|error| classify_database_error(&error))?;

            let result: Result<String, sqlx::Error> =
                sqlx::query_scalar(PROCESS_TRANSACTION_QUERY)
                    .bind(account_id.value())
                    .bind(transaction.amount())
                    .bind(transaction.description().as_str())
                    .bind(transaction.kind().code())
                    .fetch_one(&mut *database_transaction)
                    .await;

            match result {
                Ok(receipt) => {
                    database_transaction
                        .commit()
                        .await
                        .map_err(|error| classify_database_error(&error))?;
                    Ok(Bytes::from(receipt))
                }
                Err(error) => {
                    if let Err(rollback_error) = database_transaction.rollback().await {
                        tracing::warn!(%rollback_error, %account_id, "Rollback failed");
                    }
                    Err(classify_database_error(&error))
                }
            }
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.pool.close().await;
        })
    }
}
