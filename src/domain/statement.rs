//! Statement and receipt documents.
//!
//! The `PostgreSQL` store builds these documents in SQL and hands back the
//! bytes untouched; the serde types here describe the same shape and are used
//! by the in-memory store and by tests that read responses back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::TransactionKind;

/// Number of transactions a statement lists.
pub const STATEMENT_HISTORY_LIMIT: usize = 10;

/// Balance section of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Current balance; negative when the account is using its limit.
    pub total: i64,
    /// Moment the statement was produced.
    pub date: DateTime<Utc>,
    /// Overdraft ceiling.
    pub limit: i64,
}

/// One transaction as listed in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementEntry {
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of an account: balance, limit and most recent transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub balance: BalanceSnapshot,
    /// Newest first, at most [`STATEMENT_HISTORY_LIMIT`] entries.
    pub recent_transactions: Vec<StatementEntry>,
}

/// Result of a successfully applied transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub limit: i64,
    pub balance: i64,
}
