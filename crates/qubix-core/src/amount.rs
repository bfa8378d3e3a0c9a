//! Token amount type.
//!
//! Amounts are whole QU units; the ledger has no fractional denomination.
//! All arithmetic is overflow-checked.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A non-negative amount of QU.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero amount constant.
    pub const ZERO: Self = Self(0);

    /// Maximum possible amount.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates an amount of `units` QU.
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Returns the amount in QU.
    #[must_use]
    pub const fn units(self) -> u64 {
        self.0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition, for running totals that must never wrap.
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// `floor(self * percent / 100)`.
    ///
    /// Computed in `u128`, so it never overflows. For `percent <= 100` the
    /// result never exceeds `self`.
    ///
    /// ```
    /// use qubix_core::Amount;
    ///
    /// assert_eq!(Amount::new(1000).percent(3), Amount::new(30));
    /// assert_eq!(Amount::new(99).percent(3), Amount::new(2));
    /// ```
    #[must_use]
    pub const fn percent(self, percent: u64) -> Self {
        let scaled = self.0 as u128 * percent as u128 / 100;
        if scaled > u64::MAX as u128 {
            Self::MAX
        } else {
            Self(scaled as u64)
        }
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} QU", self.0)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix("QU")
            .map_or(trimmed, str::trim_end);
        if digits.starts_with('-') {
            return Err(CoreError::InvalidAmount("negative values not allowed".into()));
        }
        digits
            .replace('_', "")
            .parse::<u64>()
            .map(Self)
            .map_err(|e| CoreError::InvalidAmount(format!("{s}: {e}")))
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}
