//! Provider command implementation.

use std::io::Write;

use qubix_core::Amount;

use crate::cli::ProviderCommands;
use crate::error::CliError;
use crate::output::{Message, OutputFormat, ProviderList, ProviderView, ReputationView};
use crate::session::Session;

/// Provider command executor.
pub struct ProviderCommand<'a> {
    session: &'a mut Session,
}

impl<'a> ProviderCommand<'a> {
    /// Create a provider command over `session`.
    #[must_use]
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Execute a provider subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument does not parse or the registry
    /// rejects the operation.
    pub fn execute<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        command: &ProviderCommands,
    ) -> Result<(), CliError> {
        match command {
            ProviderCommands::Register {
                compute_power,
                price,
                stake,
            } => {
                let address = self.session.caller()?;
                let price: Amount = price.parse()?;
                let stake: Amount = stake.parse()?;
                let index = self
                    .session
                    .market_mut()
                    .register_provider(address, *compute_power, price, stake)?;
                format.write(
                    writer,
                    &Message::success(format!(
                        "Registered {address} as provider {index} with {stake} staked"
                    )),
                )?;
            }
            ProviderCommands::Activate { index } => {
                self.set_active(*index, true)?;
                format.write(writer, &Message::success(format!("Provider {index} activated")))?;
            }
            ProviderCommands::Deactivate { index } => {
                self.set_active(*index, false)?;
                format.write(
                    writer,
                    &Message::success(format!("Provider {index} deactivated")),
                )?;
            }
            ProviderCommands::Unstake { index } => {
                let released = self.session.market_mut().unstake_provider(*index)?;
                let msg = if released.is_zero() {
                    Message::info(format!("Provider {index} has nothing staked"))
                } else {
                    Message::success(format!("Released {released} to provider {index}"))
                };
                format.write(writer, &msg)?;
            }
            ProviderCommands::Reputation { index } => {
                let market = self.session.market();
                let view = ReputationView {
                    index: *index,
                    score: market.provider_reputation(*index),
                    success_rate_percent: market
                        .registry()
                        .provider(*index)
                        .and_then(|p| p.reputation.success_rate_percent()),
                };
                format.write(writer, &view)?;
            }
            ProviderCommands::List { active } => {
                let registry = self.session.market().registry();
                let providers = registry
                    .providers()
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| !*active || p.is_active)
                    .map(|(index, p)| ProviderView::new(index, p))
                    .collect();
                format.write(writer, &ProviderList { providers })?;
            }
        }
        Ok(())
    }

    fn set_active(&mut self, index: usize, active: bool) -> Result<(), CliError> {
        self.session.caller()?;
        self.session.market_mut().set_provider_active(index, active)?;
        Ok(())
    }
}
