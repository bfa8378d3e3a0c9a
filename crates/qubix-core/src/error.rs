//! Error types for qubix-core.

use thiserror::Error;

use crate::{Address, Amount};

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced while parsing or validating core primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Address has the wrong length or alphabet.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Job identifier is empty or too long.
    #[error("invalid job id: {0}")]
    InvalidJobId(String),

    /// Amount could not be parsed or overflowed.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Cryptographic operation failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Signature did not verify against the claimed key.
    #[error("invalid signature")]
    InvalidSignature,
}

/// Errors reported by the host ledger environment.
///
/// A failed host call leaves every balance untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The source account cannot cover the transfer or burn.
    #[error("insufficient balance in {account}: have {have}, need {need}")]
    InsufficientBalance {
        /// Account that was debited.
        account: Address,
        /// Current balance.
        have: Amount,
        /// Requested amount.
        need: Amount,
    },

    /// Crediting the destination would overflow its balance.
    #[error("balance overflow in {account}")]
    Overflow {
        /// Account that would overflow.
        account: Address,
    },
}

impl HostError {
    /// Create an insufficient balance error.
    #[must_use]
    pub const fn insufficient_balance(account: Address, have: Amount, need: Amount) -> Self {
        Self::InsufficientBalance {
            account,
            have,
            need,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_display() {
        let account = Address::from_public_key(&[1; 32]);
        let err = HostError::insufficient_balance(account, Amount::new(5), Amount::new(10));
        let msg = err.to_string();
        assert!(msg.contains("5 QU"));
        assert!(msg.contains("10 QU"));
        assert!(msg.contains(account.as_str()));
    }

    #[test]
    fn invalid_job_id_display() {
        let err = CoreError::InvalidJobId("empty".to_string());
        assert_eq!(err.to_string(), "invalid job id: empty");
    }
}
