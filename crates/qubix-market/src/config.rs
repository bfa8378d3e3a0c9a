//! Marketplace configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```json
//! { "fee_percent": 5, "min_stake": 2500 }
//! ```

use std::path::Path;

use qubix_core::{Address, Amount};
use qubix_escrow::{DEFAULT_FEE_PERCENT, DEFAULT_MAX_JOBS};
use qubix_registry::{DEFAULT_MAX_PROVIDERS, DEFAULT_MIN_STAKE, ReputationPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MarketError, Result};

/// Contract index the escrow ledger is deployed at by default.
pub const DEFAULT_ESCROW_CONTRACT: u32 = 1;

/// Contract index the provider registry is deployed at by default.
pub const DEFAULT_REGISTRY_CONTRACT: u32 = 2;

/// Limits, fee, and scoring parameters of a marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Maximum number of jobs the escrow ledger stores.
    pub max_jobs: usize,
    /// Maximum number of registered providers.
    pub max_providers: usize,
    /// Protocol fee burned on completion, in whole percent.
    pub fee_percent: u64,
    /// Minimum stake to register as a provider.
    pub min_stake: Amount,
    /// Score of a newly registered provider.
    pub initial_reputation: u32,
    /// Upper bound of a provider's score.
    pub max_reputation: u32,
    /// Score added per successful job.
    pub success_reward: u32,
    /// Score removed per failed job.
    pub failure_penalty: u32,
    /// Account holding escrowed job funds.
    pub escrow_custody: Address,
    /// Account holding provider stakes.
    pub registry_custody: Address,
}

impl Default for MarketConfig {
    fn default() -> Self {
        let policy = ReputationPolicy::default();
        Self {
            max_jobs: DEFAULT_MAX_JOBS,
            max_providers: DEFAULT_MAX_PROVIDERS,
            fee_percent: DEFAULT_FEE_PERCENT,
            min_stake: DEFAULT_MIN_STAKE,
            initial_reputation: policy.initial,
            max_reputation: policy.max,
            success_reward: policy.success_reward,
            failure_penalty: policy.failure_penalty,
            escrow_custody: Address::contract(DEFAULT_ESCROW_CONTRACT),
            registry_custody: Address::contract(DEFAULT_REGISTRY_CONTRACT),
        }
    }
}

impl MarketConfig {
    /// Loads and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails
    /// [`validate`](Self::validate).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), "loaded market config");
        Ok(config)
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values are usable together.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_jobs == 0 {
            return Err(MarketError::config("max_jobs must be at least 1"));
        }
        if self.max_providers == 0 {
            return Err(MarketError::config("max_providers must be at least 1"));
        }
        if self.fee_percent > 100 {
            return Err(MarketError::config(format!(
                "fee_percent must be at most 100, got {}",
                self.fee_percent
            )));
        }
        if self.max_reputation == 0 {
            return Err(MarketError::config("max_reputation must be at least 1"));
        }
        if self.initial_reputation > self.max_reputation {
            return Err(MarketError::config(format!(
                "initial_reputation {} exceeds max_reputation {}",
                self.initial_reputation, self.max_reputation
            )));
        }
        if self.escrow_custody == self.registry_custody {
            return Err(MarketError::config(
                "escrow_custody and registry_custody must differ",
            ));
        }
        Ok(())
    }

    /// The scoring rule these settings describe.
    #[must_use]
    pub const fn reputation_policy(&self) -> ReputationPolicy {
        ReputationPolicy {
            initial: self.initial_reputation,
            max: self.max_reputation,
            success_reward: self.success_reward,
            failure_penalty: self.failure_penalty,
        }
    }
}
