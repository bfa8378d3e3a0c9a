//! Settlement of escrowed funds.
//!
//! On completion the escrowed amount splits into a provider payout and a
//! protocol fee that is burned:
//!
//! `fee = floor(amount × fee_percent / 100)`, `payout = amount − fee`
//!
//! The intermediate product is computed in `u128`, so the split never
//! overflows and `payout + fee == amount` always holds.

use qubix_core::{Address, Amount, JobId};
use serde::{Deserialize, Serialize};

/// How an escrowed amount divides between provider and burn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Paid to the provider.
    pub payout: Amount,
    /// Burned.
    pub fee: Amount,
}

impl FeeSplit {
    /// Splits `amount` with a `fee_percent` fee, rounding the fee down.
    ///
    /// `fee_percent` above 100 is treated as 100.
    ///
    /// ```
    /// use qubix_core::Amount;
    /// use qubix_escrow::FeeSplit;
    ///
    /// let split = FeeSplit::new(Amount::new(1000), 3);
    /// assert_eq!(split.payout, Amount::new(970));
    /// assert_eq!(split.fee, Amount::new(30));
    /// ```
    #[must_use]
    pub const fn new(amount: Amount, fee_percent: u64) -> Self {
        let percent = if fee_percent > 100 { 100 } else { fee_percent };
        let fee = amount.percent(percent);
        let payout = Amount::new(amount.units() - fee.units());
        Self { payout, fee }
    }

    /// `payout + fee`.
    #[must_use]
    pub const fn total(&self) -> Amount {
        Amount::new(self.payout.units() + self.fee.units())
    }
}

/// Observed result of a job, to be forwarded to the provider registry.
///
/// The escrow ledger never touches reputation itself. Whoever drives the
/// ledger receives this value from [`EscrowLedger::complete`] or
/// [`EscrowLedger::refund`] and must hand it to the registry.
///
/// [`EscrowLedger::complete`]: crate::EscrowLedger::complete
/// [`EscrowLedger::refund`]: crate::EscrowLedger::refund
#[must_use = "job outcomes must be forwarded to the provider registry"]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Index of the job in the escrow ledger.
    pub job_index: usize,
    /// Identifier of the job.
    pub job_id: JobId,
    /// Provider whose reputation the outcome affects.
    pub provider: Address,
    /// True for a completed job, false for a refunded one.
    pub success: bool,
}

/// Funds moved by a successful completion.
#[must_use = "the settlement carries a job outcome that must be forwarded"]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Payout and burned fee.
    pub split: FeeSplit,
    /// Success outcome for the provider.
    pub outcome: JobOutcome,
}
