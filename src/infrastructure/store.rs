//! Store abstraction shared by the `PostgreSQL` and in-memory backends.
//!
//! Handlers only ever see [`AccountStore`] and [`StoreError`]; backend
//! specific error codes are translated into [`StoreError`] at a single point,
//! [`classify_sqlstate`].

use bytes::Bytes;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{AccountId, NewTransaction};

// =============================================================================
// Store Error
// =============================================================================

/// Errors a store operation can end with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced account does not exist.
    #[error("Account not found: {0}")]
    NotFound(String),

    /// The store refused the change, e.g. a debit that would breach the limit.
    #[error("Domain violation: {0}")]
    DomainViolation(String),

    /// Connection loss, pool exhaustion or any other unexpected failure.
    #[error("Database error: {0}")]
    Database(String),
}

// =============================================================================
// SQLSTATE Classification
// =============================================================================

/// SQLSTATE class of integrity constraint violations.
pub const INTEGRITY_CONSTRAINT_CLASS: &str = "23";

/// SQLSTATE raised when a referenced row does not exist.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Translates a SQLSTATE code into the store's error taxonomy.
///
/// | code | result |
/// |------|--------|
/// | `23503` | [`StoreError::NotFound`] |
/// | other `23xxx` (including the bare `23000` the procedure raises) | [`StoreError::DomainViolation`] |
/// | anything else | [`StoreError::Database`] |
pub fn classify_sqlstate(code: &str, message: impl Into<String>) -> StoreError {
    match code {
        FOREIGN_KEY_VIOLATION => StoreError::NotFound(message.into()),
        code if code.starts_with(INTEGRITY_CONSTRAINT_CLASS) => {
            StoreError::DomainViolation(message.into())
        }
        _ => StoreError::Database(message.into()),
    }
}

// =============================================================================
// Account Store
// =============================================================================

/// Operations the HTTP layer needs from persistent storage.
///
/// Both operations return ready-to-send JSON documents. Implementations must
/// be safe to share across request tasks.
pub trait AccountStore: Send + Sync {
    /// Returns the statement document of an account.
    ///
    /// Fails with [`StoreError::NotFound`] when the account does not exist.
    fn fetch_statement(&self, account_id: AccountId) -> BoxFuture<'_, Result<Bytes, StoreError>>;

    /// Atomically applies a transaction and returns the `{"limit", "balance"}`
    /// receipt.
    ///
    /// Either the transaction is recorded and the balance updated, or nothing
    /// changes. A debit that would take the balance below `-limit` fails with
    /// [`StoreError::DomainViolation`].
    fn apply_transaction(
        &self,
        account_id: AccountId,
        transaction: NewTransaction,
    ) -> BoxFuture<'_, Result<Bytes, StoreError>>;

    /// Releases backend resources. Called once, after the server stopped.
    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(std::future::ready(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("23000")]
    #[case("23514")]
    #[case("23505")]
    fn integrity_codes_are_domain_violations(#[case] code: &str) {
        assert_eq!(
            classify_sqlstate(code, "limit exceeded"),
            StoreError::DomainViolation("limit exceeded".to_string())
        );
    }

    #[rstest]
    fn foreign_key_violation_is_not_found() {
        assert_eq!(
            classify_sqlstate("23503", "account 9"),
            StoreError::NotFound("account 9".to_string())
        );
    }

    #[rstest]
    #[case("08006")]
    #[case("40001")]
    #[case("42P01")]
    #[case("P0001")]
    #[case("")]
    fn other_codes_are_database_errors(#[case] code: &str) {
        assert!(matches!(
            classify_sqlstate(code, "boom"),
            StoreError::Database(_)
        ));
    }
}
