//! The ledger environment contracts execute against.
//!
//! A contract never owns balances or time. It asks its [`Host`] who is
//! calling, what tick it is, and to move or destroy value. Every host call is
//! atomic: on error no balance changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Address, Amount, CoreError, HostError, PublicKey, Signature, Tick};

/// Services a contract consumes from the surrounding ledger.
pub trait Host {
    /// Identity that invoked the current operation.
    fn caller(&self) -> Address;

    /// The current tick. Never decreases.
    fn current_tick(&self) -> Tick;

    /// Balance held by `account`.
    fn balance(&self, account: &Address) -> Amount;

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `HostError::InsufficientBalance` if `from` cannot cover the
    /// amount, or `HostError::Overflow` if `to` would overflow.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), HostError>;

    /// Destroys `amount` held by `from`.
    ///
    /// # Errors
    ///
    /// Returns `HostError::InsufficientBalance` if `from` cannot cover the amount.
    fn burn(&mut self, from: &Address, amount: Amount) -> Result<(), HostError>;
}

/// An in-memory ledger implementing [`Host`].
///
/// Balances live in a sorted map so snapshots serialize deterministically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryHost {
    balances: BTreeMap<Address, Amount>,
    burned: Amount,
    tick: Tick,
    caller: Address,
}

impl MemoryHost {
    /// Creates an empty ledger at tick zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty ledger starting at `tick`.
    #[must_use]
    pub fn at_tick(tick: Tick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Credits `amount` to `account` out of thin air.
    ///
    /// # Errors
    ///
    /// Returns `HostError::Overflow` if the balance would overflow.
    pub fn mint(&mut self, account: Address, amount: Amount) -> Result<(), HostError> {
        let balance = self.balances.entry(account).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(HostError::Overflow { account })?;
        debug!(%account, %amount, "minted");
        Ok(())
    }

    /// Sets the identity for subsequent operations.
    pub fn set_caller(&mut self, caller: Address) {
        self.caller = caller;
    }

    /// Sets the caller after checking that `key` signed `message`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSignature` if the signature does not verify;
    /// the caller is left unchanged.
    pub fn set_signed_caller(
        &mut self,
        key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<Address, CoreError> {
        key.verify(message, signature)?;
        self.caller = key.address();
        Ok(self.caller)
    }

    /// Moves time forward by `ticks`.
    pub fn advance(&mut self, ticks: u64) -> Tick {
        self.tick = self.tick.after(ticks);
        trace!(tick = self.tick.value(), "advanced");
        self.tick
    }

    /// Moves time forward to `tick`. Earlier ticks are ignored.
    pub fn advance_to(&mut self, tick: Tick) -> Tick {
        self.tick = self.tick.max(tick);
        self.tick
    }

    /// Total value destroyed by [`Host::burn`].
    #[must_use]
    pub const fn burned(&self) -> Amount {
        self.burned
    }

    /// Every account with a recorded balance.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    fn debit(&mut self, from: &Address, amount: Amount) -> Result<(), HostError> {
        let have = self.balance(from);
        let remaining = have
            .checked_sub(amount)
            .ok_or(HostError::insufficient_balance(*from, have, amount))?;
        self.balances.insert(*from, remaining);
        Ok(())
    }
}

impl Host for MemoryHost {
    fn caller(&self) -> Address {
        self.caller
    }

    fn current_tick(&self) -> Tick {
        self.tick
    }

    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), HostError> {
        if from == to {
            let have = self.balance(from);
            if have < amount {
                return Err(HostError::insufficient_balance(*from, have, amount));
            }
            return Ok(());
        }

        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(HostError::Overflow { account: *to })?;
        self.debit(from, amount)?;
        self.balances.insert(*to, credited);
        trace!(%from, %to, %amount, "transferred");
        Ok(())
    }

    fn burn(&mut self, from: &Address, amount: Amount) -> Result<(), HostError> {
        self.debit(from, amount)?;
        self.burned = self.burned.saturating_add(amount);
        trace!(%from, %amount, "burned");
        Ok(())
    }
}
