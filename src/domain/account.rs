//! Account and transaction value objects.
//!
//! These types carry already-validated data from the HTTP boundary to the
//! store. Construction goes through smart constructors so a `NewTransaction`
//! can never hold an invalid kind, amount or description.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 10;

// =============================================================================
// AccountId
// =============================================================================

/// Identifier of an account, as stored in the `accounts` relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i32);

impl AccountId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.parse().map(Self)
    }
}

// =============================================================================
// TransactionKind
// =============================================================================

/// Direction of a transaction.
///
/// On the wire a credit is `"c"` and a debit is `"d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Increases the balance.
    #[serde(rename = "c")]
    Credit,
    /// Decreases the balance, bounded by the account limit.
    #[serde(rename = "d")]
    Debit,
}

impl TransactionKind {
    /// Returns the one-character wire code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Credit => "c",
            Self::Debit => "d",
        }
    }

    /// Parses a wire code. Only the exact strings `"c"` and `"d"` are accepted.
    ///
    /// # Errors
    ///
    /// Returns `TransactionRuleError::InvalidKind` for anything else.
    pub fn from_code(code: &str) -> Result<Self, TransactionRuleError> {
        match code {
            "c" => Ok(Self::Credit),
            "d" => Ok(Self::Debit),
            other => Err(TransactionRuleError::InvalidKind(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

// =============================================================================
// Description
// =============================================================================

/// Free-text label of a transaction, 1 to 10 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Description(String);

impl Description {
    /// Validates and wraps a description.
    ///
    /// Length is counted in characters, not bytes, so `"café"` is 4 long.
    ///
    /// # Errors
    ///
    /// Returns `TransactionRuleError::InvalidDescription` when the value is
    /// empty or longer than [`DESCRIPTION_MAX_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, TransactionRuleError> {
        let value = value.into();
        let length = value.chars().count();
        if (1..=DESCRIPTION_MAX_CHARS).contains(&length) {
            Ok(Self(value))
        } else {
            Err(TransactionRuleError::InvalidDescription { length })
        }
    }

    /// Returns the description text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Description {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

// =============================================================================
// NewTransaction
// =============================================================================

/// A validated transaction, ready to be applied by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    kind: TransactionKind,
    amount: i32,
    description: Description,
}

impl NewTransaction {
    /// Builds a transaction, rejecting non-positive amounts.
    ///
    /// # Errors
    ///
    /// Returns `TransactionRuleError::NonPositiveAmount` when `amount <= 0`.
    pub fn new(
        kind: TransactionKind,
        amount: i32,
        description: Description,
    ) -> Result<Self, TransactionRuleError> {
        if amount <= 0 {
            return Err(TransactionRuleError::NonPositiveAmount(amount));
        }
        Ok(Self {
            kind,
            amount,
            description,
        })
    }

    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    #[must_use]
    pub const fn amount(&self) -> i32 {
        self.amount
    }

    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// The signed change this transaction applies to a balance.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        let amount = i64::from(self.amount);
        match self.kind {
            TransactionKind::Credit => amount,
            TransactionKind::Debit => -amount,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Rule violations detected before a transaction reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionRuleError {
    #[error("kind must be \"c\" or \"d\", got {0:?}")]
    InvalidKind(String),

    #[error("description must be 1 to 10 characters, got {length}")]
    InvalidDescription { length: usize },

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i32),
}

impl TransactionRuleError {
    /// Name of the request field the rule applies to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidKind(_) => "kind",
            Self::InvalidDescription { .. } => "description",
            Self::NonPositiveAmount(_) => "amount",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
