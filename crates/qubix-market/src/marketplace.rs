//! The marketplace contract surface.

use qubix_core::{Address, Amount, Host, JobId, Tick};
use qubix_escrow::{EscrowError, EscrowLedger, EscrowStats, JobOutcome, Settlement};
use qubix_registry::{ProviderRegistry, RegistryError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};

/// An escrow ledger and a provider registry running against one host.
///
/// Every entry point reads the caller and the current tick from the host.
/// Job and provider indices are 0-based and stable for the marketplace's
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marketplace<H> {
    config: MarketConfig,
    host: H,
    escrow: EscrowLedger,
    registry: ProviderRegistry,
}

impl<H: Host> Marketplace<H> {
    /// Creates an empty marketplace on `host`.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if `config` fails validation.
    pub fn new(host: H, config: MarketConfig) -> Result<Self> {
        config.validate()?;
        let escrow =
            EscrowLedger::with_limits(config.escrow_custody, config.max_jobs, config.fee_percent);
        let registry = ProviderRegistry::with_limits(
            config.registry_custody,
            config.max_providers,
            config.min_stake,
            config.reputation_policy(),
        );
        info!(
            escrow = %config.escrow_custody,
            registry = %config.registry_custody,
            fee_percent = config.fee_percent,
            "marketplace initialized"
        );
        Ok(Self {
            config,
            host,
            escrow,
            registry,
        })
    }

    /// Checks that the ledgers still match the configuration.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Config` if the configuration itself is invalid,
    /// or `MarketError::Inconsistent` naming the first field that differs.
    pub fn verify(&self) -> Result<()> {
        let config = &self.config;
        config.validate()?;

        let mismatch = if self.escrow.custody() != config.escrow_custody {
            Some(format!(
                "escrow custody {} but configured {}",
                self.escrow.custody(),
                config.escrow_custody
            ))
        } else if self.registry.custody() != config.registry_custody {
            Some(format!(
                "registry custody {} but configured {}",
                self.registry.custody(),
                config.registry_custody
            ))
        } else if self.escrow.capacity() != config.max_jobs || self.escrow.len() > config.max_jobs {
            Some(format!(
                "{} of {} jobs but configured max_jobs {}",
                self.escrow.len(),
                self.escrow.capacity(),
                config.max_jobs
            ))
        } else if self.registry.capacity() != config.max_providers
            || self.registry.len() > config.max_providers
        {
            Some(format!(
                "{} of {} providers but configured max_providers {}",
                self.registry.len(),
                self.registry.capacity(),
                config.max_providers
            ))
        } else if self.escrow.fee_percent() != config.fee_percent {
            Some(format!(
                "fee {}% but configured {}%",
                self.escrow.fee_percent(),
                config.fee_percent
            ))
        } else if self.registry.min_stake() != config.min_stake
            || *self.registry.policy() != config.reputation_policy()
        {
            Some("registry stake or reputation rules differ from configuration".to_string())
        } else {
            None
        };

        match mismatch {
            Some(reason) => Err(MarketError::Inconsistent(reason)),
            None => Ok(()),
        }
    }

    /// Settings the marketplace was created with.
    #[must_use]
    pub const fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// The host.
    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The host, for setting the caller or advancing time.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The escrow ledger.
    #[must_use]
    pub const fn escrow(&self) -> &EscrowLedger {
        &self.escrow
    }

    /// The provider registry.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    // ─────────────────────────────────────────────────────────────
    // Escrow ledger
    // ─────────────────────────────────────────────────────────────

    /// Locks `amount` from the caller into escrow for a new job.
    ///
    /// # Errors
    ///
    /// See [`EscrowLedger::create`].
    pub fn create_job(
        &mut self,
        job_id: JobId,
        consumer: Address,
        provider: Address,
        amount: Amount,
        deadline: Tick,
    ) -> Result<usize> {
        let reserved = self.config.registry_custody;
        if consumer == reserved || provider == reserved {
            return Err(EscrowError::CustodyParty { address: reserved }.into());
        }
        Ok(self
            .escrow
            .create(&mut self.host, job_id, consumer, provider, amount, deadline)?)
    }

    /// Marks the job at `index` active.
    ///
    /// # Errors
    ///
    /// See [`EscrowLedger::start`].
    pub fn start_job(&mut self, index: usize) -> Result<()> {
        Ok(self.escrow.start(&self.host, index)?)
    }

    /// Pays out the job at `index` and burns the fee.
    ///
    /// The returned settlement carries a success outcome for
    /// [`record_outcome`](Self::record_outcome).
    ///
    /// # Errors
    ///
    /// See [`EscrowLedger::complete`].
    pub fn complete_job(&mut self, index: usize) -> Result<Settlement> {
        Ok(self.escrow.complete(&mut self.host, index)?)
    }

    /// Flags the job at `index` as disputed.
    ///
    /// # Errors
    ///
    /// See [`EscrowLedger::dispute`].
    pub fn dispute_job(&mut self, index: usize) -> Result<()> {
        Ok(self.escrow.dispute(&self.host, index)?)
    }

    /// Refunds the job at `index` after its deadline.
    ///
    /// # Errors
    ///
    /// See [`EscrowLedger::refund`].
    pub fn refund_job(&mut self, index: usize) -> Result<JobOutcome> {
        Ok(self.escrow.refund(&mut self.host, index)?)
    }

    /// Summary of the escrow ledger.
    #[must_use]
    pub fn stats(&self) -> EscrowStats {
        self.escrow.stats()
    }

    // ─────────────────────────────────────────────────────────────
    // Provider registry
    // ─────────────────────────────────────────────────────────────

    /// Registers the caller as a provider, locking `stake`.
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::register`].
    pub fn register_provider(
        &mut self,
        address: Address,
        compute_power: u32,
        price_per_hour: Amount,
        stake: Amount,
    ) -> Result<usize> {
        if address == self.config.escrow_custody {
            return Err(RegistryError::CustodyParty { address }.into());
        }
        Ok(self
            .registry
            .register(&mut self.host, address, compute_power, price_per_hour, stake)?)
    }

    /// Records a job outcome for the provider at `index` and returns the new
    /// score.
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::update_reputation`].
    pub fn update_provider_reputation(&mut self, index: usize, success: bool) -> Result<u32> {
        Ok(self.registry.update_reputation(index, success)?)
    }

    /// Activates or deactivates the provider at `index`.
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::set_active`].
    pub fn set_provider_active(&mut self, index: usize, active: bool) -> Result<()> {
        Ok(self.registry.set_active(&self.host, index, active)?)
    }

    /// Returns the stake of the inactive provider at `index`.
    ///
    /// # Errors
    ///
    /// See [`ProviderRegistry::unstake`].
    pub fn unstake_provider(&mut self, index: usize) -> Result<Amount> {
        Ok(self.registry.unstake(&mut self.host, index)?)
    }

    /// Score of the provider at `index`, or 0 if there is none.
    #[must_use]
    pub fn provider_reputation(&self, index: usize) -> u32 {
        self.registry.reputation_score(index).unwrap_or_default()
    }

    /// Applies a job outcome to the provider it names and returns the new
    /// score.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownProvider` if the provider never
    /// registered.
    pub fn record_outcome(&mut self, outcome: &JobOutcome) -> Result<u32> {
        let (index, score) = self
            .registry
            .apply_outcome(&outcome.provider, outcome.success)?;
        debug!(
            job_index = outcome.job_index,
            job_id = %outcome.job_id,
            provider_index = index,
            score,
            "job outcome recorded"
        );
        Ok(score)
    }

    /// Like [`record_outcome`](Self::record_outcome), but a provider that
    /// never registered is skipped and yields `None`.
    pub fn forward_outcome(&mut self, outcome: &JobOutcome) -> Option<u32> {
        if self.registry.index_of(&outcome.provider).is_none() {
            debug!(provider = %outcome.provider, "outcome for unregistered provider skipped");
            return None;
        }
        self.record_outcome(outcome).ok()
    }
}
