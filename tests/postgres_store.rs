//! `PostgreSQL` store tests.
//!
//! These need a database initialized with `sql/init.sql`, reachable through
//! the usual `DB_*` variables:
//!
//! ```sh
//! cargo test --test postgres_store -- --ignored
//! ```

use account_ledger_api::domain::{
    AccountId, Description, NewTransaction, Statement, TransactionKind, TransactionReceipt,
};
use account_ledger_api::infrastructure::{
    AccountStore, AppConfig, PostgresAccountStore, StoreError,
};
use rstest::rstest;

async fn connect() -> PostgresAccountStore {
    let config = AppConfig::from_env().expect("Invalid configuration");
    let store = PostgresAccountStore::connect(&config.database)
        .await
        .expect("Failed to connect to PostgreSQL");
    store.prepare().await.expect("Failed to prepare statement query");
    store
}

/// Inserts a throwaway account so tests never share balances.
async fn create_account(store: &PostgresAccountStore, limit: i32) -> AccountId {
    let id: i32 = sqlx::query_scalar(
        r#"INSERT INTO accounts ("limit", balance) VALUES ($1, 0) RETURNING id"#,
    )
    .bind(limit)
    .fetch_one(store.pool())
    .await
    .expect("Failed to insert account");
    AccountId::new(id)
}

fn transaction(kind: TransactionKind, amount: i32, description: &str) -> NewTransaction {
    NewTransaction::new(kind, amount, Description::new(description).unwrap()).unwrap()
}

#[rstest]
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn debit_scenario_against_postgres() {
    let store = connect().await;
    let account_id = create_account(&store, 1000).await;

    let receipt = store
        .apply_transaction(account_id, transaction(TransactionKind::Debit, 500, "compra"))
        .await
        .unwrap();
    let receipt: TransactionReceipt = serde_json::from_slice(&receipt).unwrap();
    assert_eq!(receipt.balance, -500);
    assert_eq!(receipt.limit, 1000);

    let error = store
        .apply_transaction(account_id, transaction(TransactionKind::Debit, 600, "compra"))
        .await
        .unwrap_err();
    assert!(matches!(error, StoreError::DomainViolation(_)));

    let statement: Statement =
        serde_json::from_slice(&store.fetch_statement(account_id).await.unwrap()).unwrap();
    assert_eq!(statement.balance.total, -500);
    assert_eq!(statement.recent_transactions.len(), 1);
    assert_eq!(statement.recent_transactions[0].description, "compra");
}

#[rstest]
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn statement_keeps_ten_newest_against_postgres() {
    let store = connect().await;
    let account_id = create_account(&store, 0).await;

    for amount in 1..=12 {
        store
            .apply_transaction(
                account_id,
                transaction(TransactionKind::Credit, amount, &format!("t{amount}")),
            )
            .await
            .unwrap();
    }

    let statement: Statement =
        serde_json::from_slice(&store.fetch_statement(account_id).await.unwrap()).unwrap();
    assert_eq!(statement.recent_transactions.len(), 10);
    assert_eq!(statement.recent_transactions[0].description, "t12");
    assert_eq!(statement.recent_transactions[9].description, "t3");
    assert_eq!(statement.balance.total, 78);
}

#[rstest]
#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn unknown_account_against_postgres() {
    let store = connect().await;
    let account_id = AccountId::new(i32::MAX);

    let statement_error = store.fetch_statement(account_id).await.unwrap_err();
    let transaction_error = store
        .apply_transaction(account_id, transaction(TransactionKind::Credit, 1, "x"))
        .await
        .unwrap_err();

    assert!(matches!(statement_error, StoreError::NotFound(_)));
    assert!(matches!(transaction_error, StoreError::NotFound(_)));
}
