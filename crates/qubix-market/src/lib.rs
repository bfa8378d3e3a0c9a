//! # qubix-market
//!
//! The Qubix marketplace contract surface.
//!
//! [`Marketplace`] pairs an escrow ledger with a provider registry behind the
//! index-addressed entry points callers invoke (`create_job`, `start_job`,
//! `register_provider`, ...). The two components never call each other; a
//! completed or refunded job yields a [`JobOutcome`] that the caller forwards
//! with [`Marketplace::record_outcome`].
//!
//! Also provided:
//!
//! - [`MarketConfig`] - limits, fee, and scoring parameters
//! - [`Snapshot`] - JSON persistence of a marketplace and its host
//! - [`SharedMarketplace`] - serialized access from many threads

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod marketplace;
pub mod shared;
pub mod snapshot;

pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use marketplace::Marketplace;
pub use qubix_escrow::{JobOutcome, Settlement};
pub use shared::SharedMarketplace;
pub use snapshot::Snapshot;
