//! # qubix-core
//!
//! Primitives shared by the Qubix escrow and provider registry contracts.
//!
//! This crate provides:
//!
//! - [`Address`] — fixed-width 60-character identity
//! - [`Wallet`] — Ed25519 keypair that derives an [`Address`]
//! - [`Amount`] — integer token amount (QU) with overflow-safe arithmetic
//! - [`Tick`] — monotonic time base for deadlines
//! - [`JobId`] — fixed-width opaque job identifier
//! - [`Host`] — the ledger environment a contract runs against
//! - [`MemoryHost`] — an in-memory [`Host`] used by tests and the CLI

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod amount;
pub mod error;
pub mod host;
pub mod job_id;
pub mod tick;
pub mod wallet;

pub use address::Address;
pub use amount::Amount;
pub use error::{CoreError, HostError, Result};
pub use host::{Host, MemoryHost};
pub use job_id::JobId;
pub use tick::Tick;
pub use wallet::{PublicKey, Signature, Wallet};
