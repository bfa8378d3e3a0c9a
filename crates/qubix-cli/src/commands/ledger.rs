//! Ledger command implementation.
//!
//! Covers the commands that act on the local host rather than a contract:
//! funding accounts, reading balances, advancing time, and totals.

use std::io::Write;

use qubix_core::{Amount, Host, Wallet};

use super::parse_address;
use crate::error::CliError;
use crate::output::{BalanceView, KeyPair, Message, OutputFormat, StatsView};
use crate::session::Session;

/// Generates a key pair. Needs no state.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn keygen<W: Write>(writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
    let wallet = Wallet::new();
    format.write(
        writer,
        &KeyPair {
            address: wallet.address(),
            secret: wallet.to_base58(),
        },
    )
}

/// Ledger command executor.
pub struct LedgerCommand<'a> {
    session: &'a mut Session,
}

impl<'a> LedgerCommand<'a> {
    /// Create a ledger command over `session`.
    #[must_use]
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Credit `amount` to `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument does not parse or the balance would
    /// overflow.
    pub fn fund<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        address: &str,
        amount: &str,
    ) -> Result<(), CliError> {
        let address = parse_address(address)?;
        let amount: Amount = amount.parse()?;
        self.session.market_mut().host_mut().mint(address, amount)?;
        format.write(writer, &Message::success(format!("Funded {address} with {amount}")))
    }

    /// Show the balance of `address`, or of the caller.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NoCaller` if neither is given.
    pub fn balance<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        address: Option<&str>,
    ) -> Result<(), CliError> {
        let address = match address {
            Some(raw) => parse_address(raw)?,
            None => self.session.caller()?,
        };
        let host = self.session.market().host();
        format.write(
            writer,
            &BalanceView {
                address,
                balance: host.balance(&address),
                tick: host.current_tick(),
            },
        )
    }

    /// Move the clock forward.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn tick<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        ticks: u64,
    ) -> Result<(), CliError> {
        let now = self.session.market_mut().host_mut().advance(ticks);
        format.write(writer, &Message::info(format!("Now at {now}")))
    }

    /// Show marketplace totals.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn stats<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let market = self.session.market();
        let registry = market.registry();
        format.write(
            writer,
            &StatsView {
                tick: market.host().current_tick(),
                escrow: market.stats(),
                providers: registry.len(),
                active_providers: registry.active_providers().count(),
                total_staked: registry.total_staked(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use qubix_core::Address;
    use qubix_market::MarketConfig;

    fn session(dir: &tempfile::TempDir) -> Session {
        Session::create(&dir.path().join("state.json"), MarketConfig::default(), false).unwrap()
    }

    #[test]
    fn fund_then_balance() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        let account = Address::contract(40);
        let format = OutputFormat::new(Format::Json);

        let mut out = Vec::new();
        let mut cmd = LedgerCommand::new(&mut session);
        cmd.fund(&mut out, &format, account.as_str(), "2_500").unwrap();

        let mut out = Vec::new();
        cmd.balance(&mut out, &format, Some(account.as_str())).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["balance"], 2500);
    }

    #[test]
    fn balance_without_caller_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        let cmd = LedgerCommand::new(&mut session);
        let err = cmd
            .balance(&mut Vec::new(), &OutputFormat::default(), None)
            .unwrap_err();
        assert!(matches!(err, CliError::NoCaller));
    }

    #[test]
    fn tick_advances_clock() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        let mut out = Vec::new();
        LedgerCommand::new(&mut session)
            .tick(&mut out, &OutputFormat::default(), 15)
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Now at tick 15\n");
        assert_eq!(session.market().host().current_tick().value(), 15);
    }

    #[test]
    fn fund_rejects_bad_amount() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        let err = LedgerCommand::new(&mut session)
            .fund(
                &mut Vec::new(),
                &OutputFormat::default(),
                Address::contract(1).as_str(),
                "-5",
            )
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn keygen_prints_address_and_secret() {
        let mut out = Vec::new();
        keygen(&mut out, &OutputFormat::new(Format::Json)).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let secret = json["secret"].as_str().unwrap();
        let wallet = Wallet::from_base58(secret).unwrap();
        assert_eq!(json["address"], wallet.address().as_str());
    }
}
