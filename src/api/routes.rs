//! Route configuration for the account API.
//!
//! # Routes
//!
//! | Method | Path | Handler | Description |
//! |--------|------|---------|-------------|
//! | GET | /accounts/{id}/statement | `get_statement` | Balance and last 10 transactions |
//! | POST | /accounts/{id}/transactions | `post_transaction` | Apply a credit or debit |
//!
//! The account id is validated before the method and action are looked at,
//! so `/accounts/abc/anything` answers 422. Every other unmatched request,
//! including a known path with the wrong method, answers 404.

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::any,
};

use super::error::ApiErrorResponse;
use super::handlers::{AppState, get_statement, post_transaction};
use crate::domain::AccountId;

/// The operation a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Statement,
    Transactions,
}

/// Resolves the account id and endpoint of an `/accounts/{id}/{action}` request.
///
/// # Errors
///
/// Returns a 422 response when `id` is not an integer, and a 404 response
/// when the method and action do not name an endpoint.
pub fn resolve_endpoint(
    method: &Method,
    id: &str,
    action: &str,
) -> Result<(AccountId, Endpoint), ApiErrorResponse> {
    let account_id: AccountId = id.parse().map_err(|_| {
        ApiErrorResponse::unprocessable_entity(format!("Invalid account id: {id}"))
    })?;

    let endpoint = match (method, action) {
        (&Method::GET, "statement") => Endpoint::Statement,
        (&Method::POST, "transactions") => Endpoint::Transactions,
        _ => return Err(route_not_found()),
    };

    Ok((account_id, endpoint))
}

fn route_not_found() -> ApiErrorResponse {
    ApiErrorResponse::not_found("Route not found")
}

/// Splits `/accounts/{id}/{action}` into its still-encoded `id` and `action`.
fn raw_segments(path: &str) -> (String, String) {
    let mut segments = path.split('/').skip(2);
    let id = segments.next().unwrap_or_default().to_string();
    let action = segments.next().unwrap_or_default().to_string();
    (id, action)
}

/// Single handler behind `/accounts/{id}/{action}`.
async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    path: Result<Path<(String, String)>, PathRejection>,
    body: Bytes,
) -> Response {
    // A segment that does not decode to UTF-8 is judged in its raw form.
    let (id, action) = match path {
        Ok(Path(segments)) => segments,
        Err(_) => raw_segments(uri.path()),
    };

    let (account_id, endpoint) = match resolve_endpoint(&method, &id, &action) {
        Ok(resolved) => resolved,
        Err(error) => return error.into_response(),
    };

    let result = match endpoint {
        Endpoint::Statement => get_statement(&state, account_id).await,
        Endpoint::Transactions => post_transaction(&state, account_id, &body).await,
    };

    result.into_response()
}

#[allow(clippy::unused_async)]
async fn not_found() -> ApiErrorResponse {
    route_not_found()
}

/// Creates the Axum router with all API routes.
///
/// # Example
///
/// ```rust,ignore
/// use account_ledger_api::api::{AppState, create_router};
/// use account_ledger_api::infrastructure::InMemoryAccountStore;
///
/// let state = AppState::new(Arc::new(InMemoryAccountStore::seeded()));
/// let router = create_router(state);
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/accounts/{id}/{action}", any(dispatch))
        .fallback(not_found)
        .with_state(state)
}

// =============================================================================
// Tests
// =============================================================================
