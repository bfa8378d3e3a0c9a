//! # qubix-registry
//!
//! Provider registry for the Qubix compute marketplace.
//!
//! This crate provides:
//!
//! - [`Provider`] records with locked stake and an activation flag
//! - [`Reputation`] — bounded, asymmetric scoring of job outcomes
//! - [`ProviderRegistry`], the append-only store that registers providers,
//!   applies outcomes, and releases stake once a provider deactivates

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod provider;
pub mod registry;
pub mod reputation;

pub use error::RegistryError;
pub use provider::Provider;
pub use registry::{ProviderRegistry, DEFAULT_MAX_PROVIDERS, DEFAULT_MIN_STAKE};
pub use reputation::{Reputation, ReputationPolicy};
