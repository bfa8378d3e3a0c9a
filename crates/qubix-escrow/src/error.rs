//! Error types for qubix-escrow.

use qubix_core::{Address, CoreError, HostError, Tick};
use thiserror::Error;

use crate::JobStatus;

/// Errors that can occur in escrow operations.
///
/// Each error is scoped to the single failed call; the ledger is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    /// The job store is full.
    #[error("job store at capacity ({capacity} jobs)")]
    CapacityExceeded {
        /// Configured maximum number of jobs.
        capacity: usize,
    },

    /// The caller is not a party allowed to perform this operation.
    #[error("caller {caller} is not authorized to {action}")]
    Unauthorized {
        /// Identity that invoked the operation.
        caller: Address,
        /// The operation that was refused.
        action: &'static str,
    },

    /// No job exists at this index.
    #[error("no job at index {index} ({count} jobs)")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of jobs stored.
        count: usize,
    },

    /// Refund requested before the deadline.
    #[error("deadline not reached: now {now}, deadline {deadline}")]
    DeadlineNotReached {
        /// Current tick.
        now: Tick,
        /// Job deadline.
        deadline: Tick,
    },

    /// The job has already been completed and paid out.
    #[error("job {index} already completed")]
    AlreadyCompleted {
        /// Index of the job.
        index: usize,
    },

    /// The job's status does not allow this operation.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// The current status.
        from: JobStatus,
        /// The attempted target status.
        to: JobStatus,
    },

    /// Deadline lies before the creation tick.
    #[error("deadline {deadline} is before creation at {created_at}")]
    InvalidDeadline {
        /// Current tick.
        created_at: Tick,
        /// Requested deadline.
        deadline: Tick,
    },

    /// A custody account was named as a party to a job.
    #[error("{address} is a custody account and cannot be a job party")]
    CustodyParty {
        /// The reserved address.
        address: Address,
    },

    /// The payout reached the provider but the fee could not be burned and
    /// the payout could not be reversed. The job stays completed.
    #[error("job {index} paid out but settlement is incomplete: {error}")]
    SettlementIncomplete {
        /// Index of the job.
        index: usize,
        /// The failed burn.
        error: HostError,
    },

    /// Malformed job input.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The paired fund movement failed.
    #[error("transfer failed: {0}")]
    Host(#[from] HostError),
}

impl EscrowError {
    /// Create an unauthorized error.
    #[must_use]
    pub const fn unauthorized(caller: Address, action: &'static str) -> Self {
        Self::Unauthorized { caller, action }
    }
}
