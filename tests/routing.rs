//! Integration tests for request routing.

mod common;

use axum::http::{Method, StatusCode};
use rstest::rstest;

use common::{create_test_app, json, send, transaction_body};

#[rstest]
#[case(Method::GET, "/accounts/abc/statement")]
#[case(Method::POST, "/accounts/abc/transactions")]
#[case(Method::GET, "/accounts/1.5/statement")]
#[case(Method::DELETE, "/accounts/abc/anything")]
#[case(Method::GET, "/accounts/%FF/statement")]
#[case(Method::POST, "/accounts/%C3%28/transactions")]
#[case(Method::GET, "/accounts//statement")]
#[tokio::test]
async fn non_integer_account_id_is_unprocessable(#[case] method: Method, #[case] uri: &str) {
    let app = create_test_app();

    let (status, _, body) = send(&app, method, uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json(&body)["code"], "UNPROCESSABLE_ENTITY");
}

#[rstest]
#[case(Method::GET, "/accounts/1")]
#[case(Method::GET, "/accounts")]
#[case(Method::GET, "/accounts/1/statement/extra")]
#[case(Method::GET, "/accounts/1/statement/")]
#[case(Method::GET, "/")]
#[case(Method::GET, "/health")]
#[case(Method::GET, "/clientes/1/extrato")]
#[case(Method::GET, "/accounts/1/balance")]
#[case(Method::GET, "/accounts/1/%FF")]
#[tokio::test]
async fn unknown_paths_are_not_found(#[case] method: Method, #[case] uri: &str) {
    let app = create_test_app();

    let (status, _, body) = send(&app, method, uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["code"], "NOT_FOUND");
}

#[rstest]
#[case(Method::POST, "/accounts/1/statement")]
#[case(Method::GET, "/accounts/1/transactions")]
#[case(Method::PUT, "/accounts/1/transactions")]
#[case(Method::DELETE, "/accounts/1/statement")]
#[tokio::test]
async fn wrong_method_is_not_found_rather_than_not_allowed(
    #[case] method: Method,
    #[case] uri: &str,
) {
    let app = create_test_app();

    let (status, _, _) = send(&app, method, uri, Some(&transaction_body("c", 1, "a"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
