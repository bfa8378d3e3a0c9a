//! The provider registry.
//!
//! Providers are stored append-only; a provider's index is its permanent
//! identifier. Stake moves into custody on registration and back out only
//! after the provider deactivates.

use qubix_core::{Address, Amount, Host, Tick};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::provider::Provider;
use crate::reputation::ReputationPolicy;

/// Default maximum number of providers.
pub const DEFAULT_MAX_PROVIDERS: usize = 500;

/// Default minimum stake to register.
pub const DEFAULT_MIN_STAKE: Amount = Amount::new(1000);

/// Owns provider records and the custody account holding their stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRegistry {
    custody: Address,
    capacity: usize,
    min_stake: Amount,
    policy: ReputationPolicy,
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Creates an empty registry with default limits and scoring.
    #[must_use]
    pub fn new(custody: Address) -> Self {
        Self::with_limits(
            custody,
            DEFAULT_MAX_PROVIDERS,
            DEFAULT_MIN_STAKE,
            ReputationPolicy::default(),
        )
    }

    /// Creates an empty registry with explicit limits and scoring.
    #[must_use]
    pub const fn with_limits(
        custody: Address,
        capacity: usize,
        min_stake: Amount,
        policy: ReputationPolicy,
    ) -> Self {
        Self {
            custody,
            capacity,
            min_stake,
            policy,
            providers: Vec::new(),
        }
    }

    /// Account that holds provider stake.
    #[must_use]
    pub const fn custody(&self) -> Address {
        self.custody
    }

    /// Maximum number of providers.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Minimum stake to register.
    #[must_use]
    pub const fn min_stake(&self) -> Amount {
        self.min_stake
    }

    /// Scoring rule applied to outcomes.
    #[must_use]
    pub const fn policy(&self) -> &ReputationPolicy {
        &self.policy
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// True if nobody has registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The provider at `index`.
    #[must_use]
    pub fn provider(&self, index: usize) -> Option<&Provider> {
        self.providers.get(index)
    }

    /// All providers in registration order.
    #[must_use]
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Index of the provider registered under `address`.
    #[must_use]
    pub fn index_of(&self, address: &Address) -> Option<usize> {
        self.providers.iter().position(|p| p.address == *address)
    }

    /// Active providers with their indices.
    pub fn active_providers(&self) -> impl Iterator<Item = (usize, &Provider)> {
        self.providers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active)
    }

    /// Stake currently held across all providers.
    #[must_use]
    pub fn total_staked(&self) -> Amount {
        self.providers
            .iter()
            .fold(Amount::ZERO, |acc, p| acc.saturating_add(p.staked_amount))
    }

    /// Registers the caller as a provider and locks `stake` into custody.
    ///
    /// Returns the new provider's index.
    ///
    /// # Errors
    ///
    /// - `CapacityExceeded` if the registry is full
    /// - `InsufficientStake` if `stake` is below the minimum
    /// - `Unauthorized` if the caller is not `address`
    /// - `CustodyParty` if `address` is the custody account
    /// - `AlreadyRegistered` if `address` already has a record
    /// - `Host` if the registrant cannot cover the stake; nothing is stored
    pub fn register<H: Host>(
        &mut self,
        host: &mut H,
        address: Address,
        compute_power: u32,
        price_per_hour: Amount,
        stake: Amount,
    ) -> Result<usize, RegistryError> {
        if self.providers.len() >= self.capacity {
            warn!(capacity = self.capacity, %address, "provider registry at capacity");
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if stake < self.min_stake {
            debug!(%address, %stake, "registration refused: stake below minimum");
            return Err(RegistryError::InsufficientStake {
                offered: stake,
                minimum: self.min_stake,
            });
        }

        let caller = host.caller();
        if caller != address {
            return Err(RegistryError::Unauthorized {
                caller,
                action: "register another address",
            });
        }
        if address == self.custody {
            warn!(%address, "registration refused: custody cannot stake into itself");
            return Err(RegistryError::CustodyParty { address });
        }
        if let Some(index) = self.index_of(&address) {
            return Err(RegistryError::AlreadyRegistered { address, index });
        }

        host.transfer(&address, &self.custody, stake)?;

        let index = self.providers.len();
        let registered_at: Tick = host.current_tick();
        self.providers.push(Provider::new(
            address,
            compute_power,
            price_per_hour,
            stake,
            registered_at,
            &self.policy,
        ));
        info!(index, %address, compute_power, %stake, "provider registered");
        Ok(index)
    }

    /// Records a job outcome for the provider at `index`.
    ///
    /// Returns the new score.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIndex` if no provider exists at `index`.
    pub fn update_reputation(&mut self, index: usize, success: bool) -> Result<u32, RegistryError> {
        let policy = self.policy;
        let provider = self.provider_mut(index)?;
        let score = provider.reputation.record(success, &policy);
        info!(index, address = %provider.address, success, score, "reputation updated");
        Ok(score)
    }

    /// Records a job outcome for the provider registered under `address`.
    ///
    /// Returns the provider's index and new score.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProvider` if `address` has no record.
    pub fn apply_outcome(
        &mut self,
        address: &Address,
        success: bool,
    ) -> Result<(usize, u32), RegistryError> {
        let index = self
            .index_of(address)
            .ok_or(RegistryError::UnknownProvider(*address))?;
        let score = self.update_reputation(index, success)?;
        Ok((index, score))
    }

    /// Sets whether the provider at `index` is active. Only the provider may
    /// change its own status.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` if no provider exists at `index`
    /// - `Unauthorized` if the caller is not the provider
    pub fn set_active<H: Host>(
        &mut self,
        host: &H,
        index: usize,
        active: bool,
    ) -> Result<(), RegistryError> {
        let caller = host.caller();
        let provider = self.provider_mut(index)?;
        if provider.address != caller {
            debug!(index, %caller, "set_active refused: caller is not the provider");
            return Err(RegistryError::Unauthorized {
                caller,
                action: "change another provider's status",
            });
        }

        provider.is_active = active;
        info!(index, address = %provider.address, active, "provider status changed");
        Ok(())
    }

    /// Returns the stake of an inactive provider to its address.
    ///
    /// Returns the amount released. Once the stake is released further calls
    /// succeed and release nothing.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` if no provider exists at `index`
    /// - `StillActive` if the provider has not deactivated
    /// - `Host` if custody cannot cover the stake; the stake stays recorded
    pub fn unstake<H: Host>(&mut self, host: &mut H, index: usize) -> Result<Amount, RegistryError> {
        let custody = self.custody;
        let provider = self.provider_mut(index)?;
        if provider.is_active {
            return Err(RegistryError::StillActive { index });
        }

        let stake = provider.staked_amount;
        if stake.is_zero() {
            debug!(index, "unstake: nothing staked");
            return Ok(Amount::ZERO);
        }

        host.transfer(&custody, &provider.address, stake)?;
        provider.staked_amount = Amount::ZERO;
        info!(index, address = %provider.address, %stake, "stake released");
        Ok(stake)
    }

    /// Current score of the provider at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIndex` if no provider exists at `index`.
    pub fn reputation_score(&self, index: usize) -> Result<u32, RegistryError> {
        self.providers
            .get(index)
            .map(|p| p.reputation.score())
            .ok_or(RegistryError::InvalidIndex {
                index,
                count: self.providers.len(),
            })
    }

    fn provider_mut(&mut self, index: usize) -> Result<&mut Provider, RegistryError> {
        let count = self.providers.len();
        self.providers
            .get_mut(index)
            .ok_or(RegistryError::InvalidIndex { index, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qubix_core::{HostError, MemoryHost};

    fn provider_address(n: u8) -> Address {
        Address::from_public_key(&[n; 32])
    }

    fn custody() -> Address {
        Address::contract(2)
    }

    fn setup() -> (ProviderRegistry, MemoryHost) {
        let mut host = MemoryHost::at_tick(Tick::new(40));
        for n in 1..=3 {
            host.mint(provider_address(n), Amount::new(5000)).unwrap();
        }
        (ProviderRegistry::new(custody()), host)
    }

    fn register(registry: &mut ProviderRegistry, host: &mut MemoryHost, n: u8) -> usize {
        host.set_caller(provider_address(n));
        registry
            .register(host, provider_address(n), 100, Amount::new(10), Amount::new(1000))
            .unwrap()
    }

    #[test]
    fn register_locks_stake() {
        let (mut registry, mut host) = setup();
        let index = register(&mut registry, &mut host, 1);

        let provider = registry.provider(index).unwrap();
        assert!(provider.is_active);
        assert_eq!(provider.reputation.score(), 500);
        assert_eq!(provider.registered_at, Tick::new(40));
        assert_eq!(host.balance(&custody()), Amount::new(1000));
        assert_eq!(host.balance(&provider_address(1)), Amount::new(4000));
        assert_eq!(registry.total_staked(), Amount::new(1000));
    }

    #[test]
    fn register_rejects_low_stake() {
        let (mut registry, mut host) = setup();
        host.set_caller(provider_address(1));
        let err = registry
            .register(&mut host, provider_address(1), 100, Amount::new(10), Amount::new(999))
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::InsufficientStake {
                offered: Amount::new(999),
                minimum: Amount::new(1000),
            }
        );
        assert!(registry.is_empty());
        assert_eq!(host.balance(&provider_address(1)), Amount::new(5000));
    }

    #[test]
    fn register_rejects_at_capacity() {
        let mut host = MemoryHost::new();
        host.mint(provider_address(1), Amount::new(5000)).unwrap();
        host.mint(provider_address(2), Amount::new(5000)).unwrap();
        let mut registry = ProviderRegistry::with_limits(
            custody(),
            1,
            DEFAULT_MIN_STAKE,
            ReputationPolicy::default(),
        );
        register(&mut registry, &mut host, 1);

        host.set_caller(provider_address(2));
        let err = registry
            .register(&mut host, provider_address(2), 1, Amount::ZERO, Amount::new(1000))
            .unwrap_err();

        assert_eq!(err, RegistryError::CapacityExceeded { capacity: 1 });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_requires_own_address() {
        let (mut registry, mut host) = setup();
        host.set_caller(provider_address(2));
        let err = registry
            .register(&mut host, provider_address(1), 1, Amount::ZERO, Amount::new(1000))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
    }

    #[test]
    fn custody_cannot_register() {
        let (mut registry, mut host) = setup();
        register(&mut registry, &mut host, 1);
        host.set_caller(custody());

        let err = registry
            .register(&mut host, custody(), 1, Amount::ZERO, Amount::new(1000))
            .unwrap_err();

        assert_eq!(err, RegistryError::CustodyParty { address: custody() });
        assert_eq!(registry.len(), 1);
        assert_eq!(host.balance(&custody()), registry.total_staked());
    }

    #[test]
    fn register_twice_is_rejected() {
        let (mut registry, mut host) = setup();
        register(&mut registry, &mut host, 1);
        let err = registry
            .register(&mut host, provider_address(1), 1, Amount::ZERO, Amount::new(1000))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyRegistered {
                address: provider_address(1),
                index: 0,
            }
        );
        assert_eq!(host.balance(&custody()), Amount::new(1000));
    }

    #[test]
    fn register_without_funds_stores_nothing() {
        let (mut registry, mut host) = setup();
        host.set_caller(provider_address(1));
        let err = registry
            .register(&mut host, provider_address(1), 1, Amount::ZERO, Amount::new(6000))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Host(HostError::InsufficientBalance { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn reputation_updates_are_asymmetric() {
        let (mut registry, mut host) = setup();
        let index = register(&mut registry, &mut host, 1);

        for _ in 0..10 {
            registry.update_reputation(index, true).unwrap();
        }
        assert_eq!(registry.reputation_score(index).unwrap(), 600);
        assert_eq!(registry.update_reputation(index, false).unwrap(), 580);

        let rep = registry.provider(index).unwrap().reputation;
        assert_eq!(rep.total_jobs(), 11);
        assert_eq!(rep.completed_jobs(), 10);
        assert_eq!(rep.failed_jobs(), 1);
    }

    #[test]
    fn apply_outcome_resolves_by_address() {
        let (mut registry, mut host) = setup();
        register(&mut registry, &mut host, 1);
        let second = register(&mut registry, &mut host, 2);

        assert_eq!(registry.apply_outcome(&provider_address(2), false).unwrap(), (second, 480));
        assert_eq!(
            registry.apply_outcome(&provider_address(3), true).unwrap_err(),
            RegistryError::UnknownProvider(provider_address(3))
        );
    }

    #[test]
    fn only_owner_toggles_status() {
        let (mut registry, mut host) = setup();
        let index = register(&mut registry, &mut host, 1);

        host.set_caller(provider_address(2));
        assert!(matches!(
            registry.set_active(&host, index, false),
            Err(RegistryError::Unauthorized { .. })
        ));
        assert!(registry.provider(index).unwrap().is_active);

        host.set_caller(provider_address(1));
        registry.set_active(&host, index, false).unwrap();
        assert!(!registry.provider(index).unwrap().is_active);
        assert_eq!(registry.active_providers().count(), 0);
    }

    #[test]
    fn unstake_requires_deactivation() {
        let (mut registry, mut host) = setup();
        let index = register(&mut registry, &mut host, 1);

        assert_eq!(
            registry.unstake(&mut host, index).unwrap_err(),
            RegistryError::StillActive { index }
        );
        assert_eq!(host.balance(&custody()), Amount::new(1000));
    }

    #[test]
    fn unstake_releases_once() {
        let (mut registry, mut host) = setup();
        let index = register(&mut registry, &mut host, 1);
        registry.set_active(&host, index, false).unwrap();

        assert_eq!(registry.unstake(&mut host, index).unwrap(), Amount::new(1000));
        assert_eq!(host.balance(&provider_address(1)), Amount::new(5000));
        assert_eq!(host.balance(&custody()), Amount::ZERO);

        assert_eq!(registry.unstake(&mut host, index).unwrap(), Amount::ZERO);
        assert_eq!(host.balance(&provider_address(1)), Amount::new(5000));
        assert_eq!(registry.provider(index).unwrap().staked_amount, Amount::ZERO);
    }

    #[test]
    fn failed_unstake_keeps_stake_recorded() {
        let (mut registry, mut host) = setup();
        let index = register(&mut registry, &mut host, 1);
        registry.set_active(&host, index, false).unwrap();
        host.burn(&custody(), Amount::new(1)).unwrap();

        assert!(matches!(registry.unstake(&mut host, index), Err(RegistryError::Host(_))));
        assert_eq!(registry.provider(index).unwrap().staked_amount, Amount::new(1000));
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let (mut registry, mut host) = setup();
        register(&mut registry, &mut host, 1);

        assert_eq!(
            registry.reputation_score(1).unwrap_err(),
            RegistryError::InvalidIndex { index: 1, count: 1 }
        );
        assert!(matches!(registry.update_reputation(7, true), Err(RegistryError::InvalidIndex { .. })));
        assert!(matches!(registry.set_active(&host, 7, false), Err(RegistryError::InvalidIndex { .. })));
        assert!(matches!(registry.unstake(&mut host, 7), Err(RegistryError::InvalidIndex { .. })));
    }

    #[test]
    fn active_providers_lists_indices() {
        let (mut registry, mut host) = setup();
        register(&mut registry, &mut host, 1);
        let second = register(&mut registry, &mut host, 2);
        host.set_caller(provider_address(1));
        registry.set_active(&host, 0, false).unwrap();

        let active: Vec<usize> = registry.active_providers().map(|(i, _)| i).collect();
        assert_eq!(active, vec![second]);
    }

    #[test]
    fn registry_serialization() {
        let (mut registry, mut host) = setup();
        register(&mut registry, &mut host, 1);
        let json = serde_json::to_string(&registry).expect("serialize");
        let restored: ProviderRegistry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, registry);
    }
}
