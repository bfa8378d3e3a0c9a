//! Integration test crate for the Qubix marketplace.
//!
//! This crate exists solely to run integration tests that span the escrow
//! ledger, the provider registry, and the marketplace surface.
//! It has no public API - all functionality is in the test modules.

#![forbid(unsafe_code)]
