//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger core.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Typed failure surfaced by every ledger operation.
///
/// Keep this focused on deterministic, business/domain failures. A failed
/// operation leaves no partial side effects; only `Unavailable` is safe to
/// retry automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Unknown account, transaction or user id.
    #[error("not found")]
    NotFound,

    /// Amount was zero, negative or not a parseable decimal.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The operation would take a balance below zero.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// A balance mutation was attempted on a frozen account.
    #[error("account is frozen")]
    AccountFrozen,

    /// Malformed transfer request (e.g. sender equals receiver).
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    /// Deletion attempted while the account still holds funds.
    #[error("account balance must be zero before deletion")]
    NonZeroBalance,

    /// Backing-store failure. Retryable: the failed attempt had no effect.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Missing or expired credentials at the API boundary.
    #[error("unauthorized")]
    Unauthorized,
}

impl LedgerError {
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn invalid_transfer(msg: impl Into<String>) -> Self {
        Self::InvalidTransfer(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether a caller may retry the same request verbatim.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(LedgerError::unavailable("lock poisoned").is_retryable());
        assert!(!LedgerError::NotFound.is_retryable());
        assert!(!LedgerError::InsufficientFunds.is_retryable());
        assert!(!LedgerError::AccountFrozen.is_retryable());
    }
}
