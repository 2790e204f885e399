//! HTTP layer: routing, request validation, and error responses.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;

pub use dto::{TransactionRequest, parse_transaction};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use handlers::{AppState, get_statement, post_transaction};
pub use response::JsonBytes;
pub use routes::{Endpoint, create_router, resolve_endpoint};
