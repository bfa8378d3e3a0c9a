//! CLI error types.

use std::path::PathBuf;

use qubix_core::{CoreError, HostError};
use qubix_market::MarketError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// A marketplace operation failed.
    #[error(transparent)]
    Market(#[from] MarketError),

    /// An address, amount, or key could not be parsed.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CoreError),

    /// The local ledger rejected a balance change.
    #[error("ledger error: {0}")]
    Host(#[from] HostError),

    /// No state file exists yet.
    #[error("no marketplace state at {}; run `qubix init` first", .0.display())]
    NoState(PathBuf),

    /// `init` would overwrite existing state.
    #[error("marketplace state already exists at {}; pass --force to overwrite", .0.display())]
    StateExists(PathBuf),

    /// The command needs a caller.
    #[error("this command needs a caller; pass --as <ADDRESS> or --key <SECRET>")]
    NoCaller,

    /// Job or provider not found.
    #[error("{kind} {index} not found")]
    NotFound {
        /// "job" or "provider".
        kind: &'static str,
        /// Requested index.
        index: usize,
    },

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
