//! Error types for qubix-market.

use qubix_escrow::EscrowError;
use qubix_registry::RegistryError;
use thiserror::Error;

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors surfaced by the marketplace.
#[derive(Debug, Error)]
pub enum MarketError {
    /// An escrow operation was rejected.
    #[error("escrow: {0}")]
    Escrow(#[from] EscrowError),

    /// A registry operation was rejected.
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Snapshot format is not understood.
    #[error("unsupported snapshot version {found}, expected {expected}")]
    SnapshotVersion {
        /// Version found on disk.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },

    /// Persisted state disagrees with its own configuration.
    #[error("inconsistent marketplace state: {0}")]
    Inconsistent(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarketError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_errors_are_prefixed() {
        let err = MarketError::from(EscrowError::AlreadyCompleted { index: 2 });
        assert_eq!(err.to_string(), "escrow: job 2 already completed");
    }

    #[test]
    fn registry_errors_are_prefixed() {
        let err = MarketError::from(RegistryError::StillActive { index: 0 });
        assert_eq!(err.to_string(), "registry: provider 0 is still active");
    }
}
