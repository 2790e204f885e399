//! Domain layer: account value objects and the documents the API returns.

pub mod account;
pub mod statement;

pub use account::{
    AccountId, DESCRIPTION_MAX_CHARS, Description, NewTransaction, TransactionKind,
    TransactionRuleError,
};
pub use statement::{
    BalanceSnapshot, STATEMENT_HISTORY_LIMIT, Statement, StatementEntry, TransactionReceipt,
};
