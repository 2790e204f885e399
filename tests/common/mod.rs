//! Common test helpers for integration tests.
//!
//! The `#![allow(dead_code)]` attribute is needed because every file under
//! `tests/` is its own crate and uses a different subset of these helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use account_ledger_api::api::{AppState, create_router};
use account_ledger_api::domain::{AccountId, Statement};
use account_ledger_api::infrastructure::InMemoryAccountStore;

/// Account 1 with limit 1000 and balance 0.
pub fn create_test_app() -> Router {
    create_app_with(InMemoryAccountStore::new().with_account(AccountId::new(1), 1000, 0))
}

pub fn create_app_with(store: InMemoryAccountStore) -> Router {
    create_router(AppState::new(Arc::new(store)))
}

/// Sends a request and returns the status plus the raw body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Option<String>, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
        .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes()
        .to_vec();

    (status, content_type, bytes)
}

pub async fn get_statement(app: &Router, account_id: i32) -> (StatusCode, Vec<u8>) {
    let (status, _, body) = send(
        app,
        Method::GET,
        &format!("/accounts/{account_id}/statement"),
        None,
    )
    .await;
    (status, body)
}

pub async fn post_transaction(app: &Router, account_id: i32, body: &str) -> (StatusCode, Vec<u8>) {
    let (status, _, body) = send(
        app,
        Method::POST,
        &format!("/accounts/{account_id}/transactions"),
        Some(body),
    )
    .await;
    (status, body)
}

/// Fetches and decodes a statement, panicking unless it answers 200.
pub async fn fetch_statement(app: &Router, account_id: i32) -> Statement {
    let (status, body) = get_statement(app, account_id).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).expect("Statement is valid JSON")
}

pub async fn current_balance(app: &Router, account_id: i32) -> i64 {
    fetch_statement(app, account_id).await.balance.total
}

pub fn transaction_body(kind: &str, amount: i64, description: &str) -> String {
    serde_json::json!({
        "kind": kind,
        "amount": amount,
        "description": description,
    })
    .to_string()
}

pub fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("Body is valid JSON")
}
