//! Error types for qubix-registry.

use qubix_core::{Address, Amount, HostError};
use thiserror::Error;

/// Errors that can occur in registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The provider store is full.
    #[error("provider registry at capacity ({capacity} providers)")]
    CapacityExceeded {
        /// Configured maximum number of providers.
        capacity: usize,
    },

    /// Stake below the registration minimum.
    #[error("insufficient stake: offered {offered}, minimum {minimum}")]
    InsufficientStake {
        /// Stake offered.
        offered: Amount,
        /// Required minimum.
        minimum: Amount,
    },

    /// Caller does not own the provider record.
    #[error("caller {caller} is not authorized to {action}")]
    Unauthorized {
        /// Identity that invoked the operation.
        caller: Address,
        /// The operation that was refused.
        action: &'static str,
    },

    /// No provider exists at this index.
    #[error("no provider at index {index} ({count} providers)")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of providers stored.
        count: usize,
    },

    /// Stake cannot be withdrawn while the provider is active.
    #[error("provider {index} is still active")]
    StillActive {
        /// Index of the provider.
        index: usize,
    },

    /// The address already has a provider record.
    #[error("provider {address} already registered at index {index}")]
    AlreadyRegistered {
        /// Registered address.
        address: Address,
        /// Existing index.
        index: usize,
    },

    /// A custody account tried to register as a provider.
    #[error("{address} is a custody account and cannot register")]
    CustodyParty {
        /// The reserved address.
        address: Address,
    },

    /// No provider is registered under this address.
    #[error("unknown provider: {0}")]
    UnknownProvider(Address),

    /// The paired stake movement failed.
    #[error("stake transfer failed: {0}")]
    Host(#[from] HostError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stake_display() {
        let err = RegistryError::InsufficientStake {
            offered: Amount::new(999),
            minimum: Amount::new(1000),
        };
        assert_eq!(
            err.to_string(),
            "insufficient stake: offered 999 QU, minimum 1000 QU"
        );
    }

    #[test]
    fn still_active_display() {
        assert_eq!(
            RegistryError::StillActive { index: 3 }.to_string(),
            "provider 3 is still active"
        );
    }
}
