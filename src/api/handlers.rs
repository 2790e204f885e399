//! HTTP handlers for the statement and transaction endpoints.
//!
//! Handlers receive an already-parsed [`AccountId`] from the router and only
//! talk to the store through [`AccountStore`].

use std::sync::Arc;

use super::dto::parse_transaction;
use super::error::ApiErrorResponse;
use super::response::JsonBytes;
use crate::domain::AccountId;
use crate::infrastructure::AccountStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Built once at startup and cloned into every request; the store behind the
/// `Arc` is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("store", &"Arc<dyn AccountStore>")
            .finish()
    }
}

// =============================================================================
// GET /accounts/{id}/statement
// =============================================================================

/// Returns the statement of an account.
///
/// # Response
///
/// - **200 OK**: `{"balance": {...}, "recent_transactions": [...]}`
/// - **404 Not Found**: unknown account
/// - **500 Internal Server Error**: store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the 404 and 500 cases above.
pub async fn get_statement(
    state: &AppState,
    account_id: AccountId,
) -> Result<JsonBytes, ApiErrorResponse> {
    let document = state.store.fetch_statement(account_id).await?;
    Ok(JsonBytes(document))
}

// =============================================================================
// POST /accounts/{id}/transactions
// =============================================================================

/// Applies a credit or debit to an account.
///
/// # Request Body
///
/// ```json
/// { "kind": "c|d", "amount": 500, "description": "compra" }
/// ```
///
/// # Response
///
/// - **200 OK**: `{"limit": 1000, "balance": -500}`
/// - **404 Not Found**: unknown account
/// - **422 Unprocessable Entity**: malformed body, rule violation, or limit breach
/// - **500 Internal Server Error**: store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the 404, 422 and 500 cases above. An
/// invalid body never reaches the store.
pub async fn post_transaction(
    state: &AppState,
    account_id: AccountId,
    body: &[u8],
) -> Result<JsonBytes, ApiErrorResponse> {
    let transaction = parse_transaction(body)?;

    tracing::debug!(
        %account_id,
        kind = %transaction.kind(),
        amount = transaction.amount(),
        "Applying transaction"
    );

    let receipt = state
        .store
        .apply_transaction(account_id, transaction)
        .await?;
    Ok(JsonBytes(receipt))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Statement, TransactionReceipt};
    use crate::infrastructure::{InMemoryAccountStore, StoreError};
    use axum::http::StatusCode;
    use bytes::Bytes;
    use futures::future::BoxFuture;
    use rstest::{fixture, rstest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that fails every call and counts how often it was reached.
    #[derive(Default)]
    struct FailingStore {
        calls: AtomicUsize,
    }

    impl AccountStore for FailingStore {
        fn fetch_statement(&self, _: AccountId) -> BoxFuture<'_, Result<Bytes, StoreError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(StoreError::Database("connection reset".into())) })
        }

        fn apply_transaction(
            &self,
            _: AccountId,
            _: crate::domain::NewTransaction,
        ) -> BoxFuture<'_, Result<Bytes, StoreError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(StoreError::Database("connection reset".into())) })
        }
    }

    #[fixture]
    fn state() -> AppState {
        AppState::new(Arc::new(
            InMemoryAccountStore::new().with_account(AccountId::new(1), 1000, 0),
        ))
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_statement_returns_document(state: AppState) {
        let JsonBytes(document) = get_statement(&state, AccountId::new(1)).await.unwrap();

        let statement: Statement = serde_json::from_slice(&document).unwrap();
        assert_eq!(statement.balance.total, 0);
        assert_eq!(statement.balance.limit, 1000);
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_statement_unknown_account(state: AppState) {
        let error = get_statement(&state, AccountId::new(2)).await.unwrap_err();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[tokio::test]
    async fn test_post_transaction_returns_receipt(state: AppState) {
        let JsonBytes(document) = post_transaction(
            &state,
            AccountId::new(1),
            br#"{"kind":"d","amount":500,"description":"compra"}"#,
        )
        .await
        .unwrap();

        let receipt: TransactionReceipt = serde_json::from_slice(&document).unwrap();
        assert_eq!(receipt.balance, -500);
        assert_eq!(receipt.limit, 1000);
    }

    #[rstest]
    #[tokio::test]
    async fn test_invalid_body_never_reaches_store() {
        let store = Arc::new(FailingStore::default());
        let state = AppState::new(store.clone());

        let error = post_transaction(
            &state,
            AccountId::new(1),
            br#"{"kind":"x","amount":1,"description":"a"}"#,
        )
        .await
        .unwrap_err();

        assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let state = AppState::new(Arc::new(FailingStore::default()));

        let statement_error = get_statement(&state, AccountId::new(1)).await.unwrap_err();
        let transaction_error = post_transaction(
            &state,
            AccountId::new(1),
            br#"{"kind":"c","amount":1,"description":"a"}"#,
        )
        .await
        .unwrap_err();

        assert_eq!(statement_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transaction_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(statement_error.error.message, "An internal error occurred");
    }
}
