//! In-memory implementation of [`AccountStore`].
//!
//! Mirrors what the `PostgreSQL` procedure does: the limit check, the
//! newest-first history capped at ten entries and the error taxonomy. The map
//! sits behind a `tokio::sync::RwLock`, whose write guard plays the role of
//! the row lock taken by `process_transaction`.

use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use chrono::Utc;
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::RwLock;

use super::store::{AccountStore, StoreError};
use crate::domain::{
    AccountId, BalanceSnapshot, NewTransaction, STATEMENT_HISTORY_LIMIT, Statement,
    StatementEntry, TransactionReceipt,
};

/// Limits of the five accounts the reference database is seeded with.
pub const SEED_ACCOUNT_LIMITS: [i64; 5] = [100_000, 80_000, 1_000_000, 10_000_000, 500_000];

#[derive(Debug, Clone)]
struct AccountRecord {
    limit: i64,
    balance: i64,
    /// Newest first.
    history: VecDeque<StatementEntry>,
}

impl AccountRecord {
    fn new(limit: i64, balance: i64) -> Self {
        Self {
            limit,
            balance,
            history: VecDeque::with_capacity(STATEMENT_HISTORY_LIMIT),
        }
    }
}

fn to_json_bytes<T: Serialize>(value: &T) -> Result<Bytes, StoreError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|error| StoreError::Database(error.to_string()))
}

// =============================================================================
// In-Memory Account Store
// =============================================================================

/// Process-local account store.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryAccountStore::new().with_account(AccountId::new(1), 1000, 0);
/// let receipt = store.apply_transaction(AccountId::new(1), transaction).await?;
/// ```
///
/// Share it behind an `Arc`, as the HTTP layer does with `Arc<dyn AccountStore>`.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, AccountRecord>>,
}

impl InMemoryAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the five reference accounts (ids 1 to 5, zero
    /// balance).
    #[must_use]
    pub fn seeded() -> Self {
        SEED_ACCOUNT_LIMITS
            .iter()
            .zip(1..)
            .fold(Self::new(), |store, (limit, id)| {
                store.with_account(AccountId::new(id), *limit, 0)
            })
    }

    /// Adds (or replaces) an account while the store is still being built.
    #[must_use]
    pub fn with_account(mut self, account_id: AccountId, limit: i64, balance: i64) -> Self {
        self.accounts
            .get_mut()
            .insert(account_id, AccountRecord::new(limit, balance));
        self
    }

    fn apply_locked(
        accounts: &mut HashMap<AccountId, AccountRecord>,
        account_id: AccountId,
        transaction: &NewTransaction,
    ) -> Result<TransactionReceipt, StoreError> {
        let record = accounts
            .get_mut(&account_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {account_id}")))?;

        let new_balance = record
            .balance
            .checked_add(transaction.signed_amount())
            .ok_or_else(|| StoreError::DomainViolation("balance overflow".to_string()))?;
        if new_balance < -record.limit {
            return Err(StoreError::DomainViolation("limit exceeded".to_string()));
        }

        // Keep display order stable even if the wall clock steps back.
        let now = Utc::now();
        let created_at = record
            .history
            .front()
            .map_or(now, |newest| newest.created_at.max(now));

        record.balance = new_balance;
        record.history.push_front(StatementEntry {
            amount: i64::from(transaction.amount()),
            kind: transaction.kind(),
            description: transaction.description().as_str().to_string(),
            created_at,
        });
        record.history.truncate(STATEMENT_HISTORY_LIMIT);

        Ok(TransactionReceipt {
            limit: record.limit,
            balance: record.balance,
        })
    }
}

impl AccountStore for InMemoryAccountStore {
    fn fetch_statement(&self, account_id: AccountId) -> BoxFuture<'_, Result<Bytes, StoreError>> {
        Box::pin(async move {
            let accounts = self.accounts.read().await;
            let record = accounts
                .get(&account_id)
                .ok_or_else(|| StoreError::NotFound(format!("account {account_id}")))?;

            let statement = Statement {
                balance: BalanceSnapshot {
                    total: record.balance,
                    date: Utc::now(),
                    limit: record.limit,
                },
                recent_transactions: record.history.iter().cloned().collect(),
            };
            to_json_bytes(&statement)
        })
    }

    fn apply_transaction(
        &self,
        account_id: AccountId,
        transaction: NewTransaction,
    ) -> BoxFuture<'_, Result<Bytes, StoreError>> {
        Box::pin(async move {
            let mut accounts = self.accounts.write().await;
            let receipt = Self::apply_locked(&mut accounts, account_id, &transaction)?;
            to_json_bytes(&receipt)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
