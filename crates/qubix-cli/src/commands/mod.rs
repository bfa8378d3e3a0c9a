//! CLI command implementations.
//!
//! Each submodule implements a group of CLI commands:
//! - [`ledger`] - State setup, keys, balances, and the clock
//! - [`job`] - Escrowed job lifecycle
//! - [`provider`] - Provider registration and staking

pub mod job;
pub mod ledger;
pub mod provider;

pub use job::JobCommand;
pub use ledger::LedgerCommand;
pub use provider::ProviderCommand;

use qubix_core::Address;

use crate::error::CliError;

/// Parses an address argument.
pub(crate) fn parse_address(raw: &str) -> Result<Address, CliError> {
    Ok(raw.trim().parse()?)
}
