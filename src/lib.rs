//! # account-ledger-api
//!
//! HTTP service exposing account statements and balance-changing
//! transactions over a `PostgreSQL` store.
//!
//! ## Layout
//!
//! - [`domain`]: account ids, transaction rules, statement documents
//! - [`infrastructure`]: configuration and the [`AccountStore`](infrastructure::AccountStore) backends
//! - [`api`]: routing, request validation, and error responses
//!
//! Balance invariants are enforced by the store: `PostgreSQL` through the
//! `process_transaction` function in `sql/init.sql`, the in-memory store
//! through a write lock held across the read-modify-write.

pub mod api;
pub mod domain;
pub mod infrastructure;
