//! Marketplace state loaded from and saved to the state file.

use std::path::{Path, PathBuf};

use qubix_core::{Address, MemoryHost, Wallet};
use qubix_market::{MarketConfig, Marketplace, Snapshot};
use tracing::{debug, info};

use crate::error::CliError;

/// A marketplace opened from a state file.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    market: Marketplace<MemoryHost>,
    caller: Option<Address>,
}

impl Session {
    /// Loads the marketplace at `path`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NoState` if the file does not exist, or an error if
    /// it cannot be read.
    pub fn open(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Err(CliError::NoState(path.to_path_buf()));
        }
        let snapshot = Snapshot::<MemoryHost>::load(path)?;
        debug!(path = %path.display(), saved_at = %snapshot.saved_at, "state loaded");
        Ok(Self {
            path: path.to_path_buf(),
            market: snapshot.into_market(),
            caller: None,
        })
    }

    /// Creates an empty marketplace at `path`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::StateExists` if the file exists and `force` is
    /// false, or an error if `config` is invalid.
    pub fn create(path: &Path, config: MarketConfig, force: bool) -> Result<Self, CliError> {
        if path.exists() && !force {
            return Err(CliError::StateExists(path.to_path_buf()));
        }
        let market = Marketplace::new(MemoryHost::new(), config)?;
        info!(path = %path.display(), "new marketplace state");
        Ok(Self {
            path: path.to_path_buf(),
            market,
            caller: None,
        })
    }

    /// Sets who the next operation runs as.
    ///
    /// A `key` is a base58 secret and the caller is the address derived
    /// from it. An `address` is taken as given with no proof of ownership;
    /// it exists for local testing. Without either, the caller is the null
    /// address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address or key does not parse.
    pub fn authenticate(
        &mut self,
        address: Option<&str>,
        key: Option<&str>,
    ) -> Result<Option<Address>, CliError> {
        let caller = match (address, key) {
            (_, Some(secret)) => Some(Wallet::from_base58(secret)?.address()),
            (Some(address), None) => Some(address.parse::<Address>()?),
            (None, None) => None,
        };
        self.market
            .host_mut()
            .set_caller(caller.unwrap_or(Address::NULL));
        if let Some(caller) = caller {
            debug!(%caller, from_key = key.is_some(), "caller set");
        }
        self.caller = caller;
        Ok(caller)
    }

    /// The authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NoCaller` if none was given.
    pub fn caller(&self) -> Result<Address, CliError> {
        self.caller.ok_or(CliError::NoCaller)
    }

    /// The marketplace.
    #[must_use]
    pub const fn market(&self) -> &Marketplace<MemoryHost> {
        &self.market
    }

    /// The marketplace, for operations.
    pub fn market_mut(&mut self) -> &mut Marketplace<MemoryHost> {
        &mut self.market
    }

    /// Writes the marketplace back to its state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn save(&self) -> Result<(), CliError> {
        Snapshot::new(self.market.clone()).save(&self.path)?;
        Ok(())
    }
}
