//! Provider records.

use qubix_core::{Address, Amount, Tick};
use serde::{Deserialize, Serialize};

use crate::reputation::{Reputation, ReputationPolicy};

/// A registered compute supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Owner identity. Immutable once registered.
    pub address: Address,
    /// Advertised compute power in TFLOPS. Informational.
    pub compute_power: u32,
    /// Advertised hourly price. Informational.
    pub price_per_hour: Amount,
    /// Score and job counters.
    pub reputation: Reputation,
    /// Stake held in registry custody.
    pub staked_amount: Amount,
    /// Stake can only be withdrawn while this is false.
    pub is_active: bool,
    /// Tick at registration.
    pub registered_at: Tick,
}

impl Provider {
    /// Creates an active provider at the policy's initial score.
    #[must_use]
    pub fn new(
        address: Address,
        compute_power: u32,
        price_per_hour: Amount,
        stake: Amount,
        registered_at: Tick,
        policy: &ReputationPolicy,
    ) -> Self {
        Self {
            address,
            compute_power,
            price_per_hour,
            reputation: Reputation::new(policy),
            staked_amount: stake,
            is_active: true,
            registered_at,
        }
    }
}
