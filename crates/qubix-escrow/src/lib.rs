//! # qubix-escrow
//!
//! Escrow ledger for the Qubix compute marketplace.
//!
//! This crate provides:
//!
//! - [`Job`] records and the [`JobStatus`] state machine
//! - [`EscrowLedger`], which locks consumer funds in custody and pays them out
//!   on completion or back on refund
//! - Fee settlement ([`FeeSplit`], [`Settlement`]) and the [`JobOutcome`] event
//!   that must be forwarded to the provider registry

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod job;
pub mod ledger;
pub mod settlement;

pub use error::EscrowError;
pub use job::{Job, JobStatus};
pub use ledger::{EscrowLedger, EscrowStats, DEFAULT_FEE_PERCENT, DEFAULT_MAX_JOBS};
pub use settlement::{FeeSplit, JobOutcome, Settlement};
