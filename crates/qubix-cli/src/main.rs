//! Qubix CLI binary entrypoint.
//!
//! This is the main entry point for the `qubix` command-line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use qubix_cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }

    let mut stdout = io::stdout().lock();
    match qubix_cli::run(&cli, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qubix_cli::{Commands, Format};

    #[test]
    fn cli_parses_stats() {
        let cli = Cli::parse_from(["qubix", "stats"]);
        assert!(matches!(cli.command, Commands::Stats));
        assert_eq!(cli.format, Format::Table);
        assert!(!cli.log_json);
    }

    #[test]
    fn cli_respects_log_json_flag() {
        let cli = Cli::parse_from(["qubix", "--log-json", "keygen"]);
        assert!(cli.log_json);
    }
}
