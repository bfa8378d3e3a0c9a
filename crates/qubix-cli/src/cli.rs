//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Qubix - escrowed compute jobs and provider reputation.
#[derive(Parser, Debug, Clone)]
#[command(name = "qubix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Marketplace state file.
    #[arg(short, long, env = "QUBIX_STATE", default_value = "qubix-state.json")]
    pub state: PathBuf,

    /// Marketplace config file, read by `init`.
    #[arg(short, long, env = "QUBIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to act as, without proof of ownership. For local testing;
    /// use --key to act as a wallet you hold.
    #[arg(long = "as", value_name = "ADDRESS", conflicts_with = "key")]
    pub caller: Option<String>,

    /// Base58 secret key; commands run as the address derived from it.
    #[arg(long, env = "QUBIX_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Emit logs as JSON.
    #[arg(long)]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new, empty marketplace state file.
    Init {
        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },

    /// Generate a new key pair.
    Keygen,

    /// Credit an account on the local ledger.
    Fund {
        /// Account to credit.
        address: String,
        /// Amount in QU.
        amount: String,
    },

    /// Show an account balance.
    Balance {
        /// Account to inspect. Defaults to the caller.
        address: Option<String>,
    },

    /// Advance the ledger clock.
    Tick {
        /// Number of ticks to advance.
        #[arg(default_value_t = 1)]
        ticks: u64,
    },

    /// Escrowed job commands.
    Job {
        /// Job subcommand to execute.
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Provider registry commands.
    Provider {
        /// Provider subcommand to execute.
        #[command(subcommand)]
        command: ProviderCommands,
    },

    /// Show escrow totals.
    Stats,
}

/// Job subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum JobCommands {
    /// Lock funds for a job. The caller is the consumer.
    Create {
        /// Provider address.
        provider: String,
        /// Amount in QU.
        amount: String,
        /// Ticks from now until the job may be refunded.
        #[arg(short, long, default_value_t = 100)]
        ttl: u64,
        /// Job identifier. A random one is generated if omitted.
        #[arg(long)]
        id: Option<String>,
    },

    /// Mark a pending job as active. The caller must be the provider.
    Start {
        /// Job index.
        index: usize,
    },

    /// Pay out a job and burn the fee. The caller must be the provider.
    ///
    /// The outcome is recorded against the provider's reputation if the
    /// provider is registered.
    Complete {
        /// Job index.
        index: usize,
    },

    /// Flag a job as disputed. The caller must be a party to it.
    Dispute {
        /// Job index.
        index: usize,
    },

    /// Return a job's funds to its consumer after the deadline.
    ///
    /// The outcome is recorded against the provider's reputation if the
    /// provider is registered.
    Refund {
        /// Job index.
        index: usize,
    },

    /// Show one job.
    Show {
        /// Job index.
        index: usize,
    },

    /// List jobs.
    List {
        /// Only jobs where this address is consumer or provider.
        #[arg(long)]
        party: Option<String>,
    },
}

/// Provider subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ProviderCommands {
    /// Register the caller as a provider and lock a stake.
    Register {
        /// Compute power in TFLOPS.
        #[arg(long)]
        compute_power: u32,
        /// Price per hour in QU.
        #[arg(long)]
        price: String,
        /// Stake in QU.
        #[arg(long)]
        stake: String,
    },

    /// Accept new jobs again.
    Activate {
        /// Provider index.
        index: usize,
    },

    /// Stop accepting jobs. Required before unstaking.
    Deactivate {
        /// Provider index.
        index: usize,
    },

    /// Withdraw the stake of an inactive provider.
    Unstake {
        /// Provider index.
        index: usize,
    },

    /// Show a provider's reputation score.
    Reputation {
        /// Provider index.
        index: usize,
    },

    /// List providers.
    List {
        /// Only active providers.
        #[arg(long)]
        active: bool,
    },
}
