//! Request DTOs and their validation.
//!
//! The transaction body is deserialized from raw bytes rather than through
//! axum's `Json` extractor: a missing `Content-Type` or a malformed document
//! must end in 422 like every other invalid input.

use serde::Deserialize;

use super::error::{FieldError, ValidationError};
use crate::domain::{Description, NewTransaction, TransactionKind, TransactionRuleError};

/// Body of `POST /accounts/{id}/transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionRequest {
    /// `"c"` for credit, `"d"` for debit.
    pub kind: String,
    /// Positive amount in the smallest currency unit.
    pub amount: i32,
    /// 1 to 10 characters.
    pub description: String,
}

fn field_error(error: &TransactionRuleError) -> FieldError {
    FieldError::new(error.field(), error.to_string())
}

impl TransactionRequest {
    /// Parses a request body.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the body is not a JSON object of the
    /// expected shape (including a fractional or out-of-range `amount`).
    pub fn from_slice(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body)
            .map_err(|error| ValidationError::single("body", format!("Invalid JSON body: {error}")))
    }

    /// Validates the request into a domain transaction.
    ///
    /// All field rules are checked so the response lists every problem at
    /// once.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when `kind`, `description` or `amount`
    /// break their rules.
    pub fn validate(self) -> Result<NewTransaction, ValidationError> {
        let mut errors = Vec::new();

        let kind = TransactionKind::from_code(&self.kind)
            .map_err(|error| errors.push(field_error(&error)))
            .ok();
        let description = Description::new(self.description)
            .map_err(|error| errors.push(field_error(&error)))
            .ok();
        if self.amount <= 0 {
            errors.push(field_error(&TransactionRuleError::NonPositiveAmount(
                self.amount,
            )));
        }

        match (kind, description) {
            (Some(kind), Some(description)) if errors.is_empty() => {
                NewTransaction::new(kind, self.amount, description)
                    .map_err(|error| ValidationError::new(vec![field_error(&error)]))
            }
            _ => Err(ValidationError::new(errors)),
        }
    }
}

/// Parses and validates a transaction body in one step.
///
/// # Errors
///
/// Returns `ValidationError` for malformed JSON or any rule violation.
pub fn parse_transaction(body: &[u8]) -> Result<NewTransaction, ValidationError> {
    TransactionRequest::from_slice(body)?.validate()
}

// =============================================================================
// Tests
// =============================================================================
