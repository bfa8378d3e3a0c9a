//! # qubix-cli
//!
//! Command-line interface to a Qubix marketplace kept in a local state file.
//!
//! Provides commands for:
//! - Creating state and generating keys
//! - Funding accounts and advancing the clock
//! - Escrowed job lifecycle
//! - Provider registration, staking, and reputation
//!
//! Each invocation loads the state file, runs one operation against a
//! [`qubix_core::MemoryHost`], and saves the state only if the operation
//! succeeded and changed something.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod session;

use std::io::Write;

pub use cli::{Cli, Commands, Format, JobCommands, ProviderCommands};
pub use error::CliError;
pub use output::OutputFormat;
pub use session::Session;

use commands::{JobCommand, LedgerCommand, ProviderCommand};
use qubix_market::MarketConfig;

/// Runs one parsed command, writing its output to `writer`.
///
/// # Errors
///
/// Returns an error if the state cannot be loaded or saved, or the command
/// fails. Failed commands leave the state file untouched.
pub fn run<W: Write>(cli: &Cli, writer: &mut W) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);

    match &cli.command {
        Commands::Init { force } => {
            let config = match &cli.config {
                Some(path) => MarketConfig::from_file(path)?,
                None => MarketConfig::default(),
            };
            let session = Session::create(&cli.state, config, *force)?;
            session.save()?;
            format.write(
                writer,
                &output::Message::success(format!(
                    "Initialized marketplace at {}",
                    cli.state.display()
                )),
            )?;
            return Ok(());
        }
        Commands::Keygen => return commands::ledger::keygen(writer, &format),
        _ => {}
    }

    let mut session = Session::open(&cli.state)?;
    session.authenticate(cli.caller.as_deref(), cli.key.as_deref())?;

    let mut out = Vec::new();
    match &cli.command {
        Commands::Init { .. } | Commands::Keygen => {}
        Commands::Fund { address, amount } => {
            LedgerCommand::new(&mut session).fund(&mut out, &format, address, amount)?;
        }
        Commands::Balance { address } => {
            LedgerCommand::new(&mut session).balance(&mut out, &format, address.as_deref())?;
        }
        Commands::Tick { ticks } => {
            LedgerCommand::new(&mut session).tick(&mut out, &format, *ticks)?;
        }
        Commands::Stats => {
            LedgerCommand::new(&mut session).stats(&mut out, &format)?;
        }
        Commands::Job { command } => {
            JobCommand::new(&mut session).execute(&mut out, &format, command)?;
        }
        Commands::Provider { command } => {
            ProviderCommand::new(&mut session).execute(&mut out, &format, command)?;
        }
    }

    if mutates(&cli.command) {
        session.save()?;
    }
    writer.write_all(&out)?;
    Ok(())
}

/// True for commands that change marketplace state.
#[must_use]
pub const fn mutates(command: &Commands) -> bool {
    match command {
        Commands::Keygen | Commands::Balance { .. } | Commands::Stats => false,
        Commands::Job { command } => !matches!(
            command,
            JobCommands::Show { .. } | JobCommands::List { .. }
        ),
        Commands::Provider { command } => !matches!(
            command,
            ProviderCommands::Reputation { .. } | ProviderCommands::List { .. }
        ),
        Commands::Init { .. } | Commands::Fund { .. } | Commands::Tick { .. } => true,
    }
}
