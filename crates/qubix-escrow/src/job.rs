//! Job records and their status machine.

use std::fmt;

use qubix_core::{Address, Amount, JobId, Tick};
use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// Lifecycle status of an escrowed job.
///
/// ```text
/// Pending ──▶ Active ──▶ Completed
///    │           │
///    ├──▶ Disputed ◀┘
///    │       │
///    └───────┴──▶ Refunded   (after the deadline)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Funds locked, provider has not started.
    Pending,
    /// Provider is working on the job.
    Active,
    /// Provider paid, fee burned.
    Completed,
    /// A party raised a dispute. Resolution happens off-ledger.
    Disputed,
    /// Funds returned to the consumer after the deadline.
    Refunded,
}

impl JobStatus {
    /// Checks if a transition to the target status is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use JobStatus::{Active, Completed, Disputed, Pending, Refunded};

        matches!(
            (self, target),
            (Pending, Active)
                | (Pending | Active, Completed)
                | (Pending | Active, Disputed)
                | (Pending | Active | Disputed, Refunded)
        )
    }

    /// True while the escrowed amount sits in custody.
    #[must_use]
    pub const fn holds_funds(&self) -> bool {
        matches!(self, Self::Pending | Self::Active | Self::Disputed)
    }

    /// True once no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Refunded)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Active => write!(f, "Active"),
            Self::Completed => write!(f, "Completed"),
            Self::Disputed => write!(f, "Disputed"),
            Self::Refunded => write!(f, "Refunded"),
        }
    }
}

/// One escrowed compute engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Consumer-supplied identifier.
    pub job_id: JobId,
    /// Party that locked the funds.
    pub consumer: Address,
    /// Party paid on completion.
    pub provider: Address,
    /// Amount held in escrow.
    pub amount: Amount,
    /// Tick at creation.
    pub created_at: Tick,
    /// Tick after which anyone may trigger a refund.
    pub deadline: Tick,
    /// Current status.
    pub status: JobStatus,
    /// Fee burned on completion.
    pub fee: Option<Amount>,
    /// Tick at which funds left custody.
    pub settled_at: Option<Tick>,
}

impl Job {
    /// Creates a pending job.
    ///
    /// # Errors
    ///
    /// Returns `EscrowError::InvalidDeadline` if `deadline < created_at`.
    pub fn new(
        job_id: JobId,
        consumer: Address,
        provider: Address,
        amount: Amount,
        created_at: Tick,
        deadline: Tick,
    ) -> Result<Self, EscrowError> {
        if deadline < created_at {
            return Err(EscrowError::InvalidDeadline {
                created_at,
                deadline,
            });
        }
        Ok(Self {
            job_id,
            consumer,
            provider,
            amount,
            created_at,
            deadline,
            status: JobStatus::Pending,
            fee: None,
            settled_at: None,
        })
    }

    /// True if `who` is the consumer or the provider.
    #[must_use]
    pub fn is_party(&self, who: &Address) -> bool {
        self.consumer == *who || self.provider == *who
    }

    /// Moves to `target`, returning the previous status.
    pub(crate) fn transition_to(&mut self, target: JobStatus) -> Result<JobStatus, EscrowError> {
        if self.status.can_transition_to(&target) {
            let previous = self.status;
            self.status = target;
            Ok(previous)
        } else {
            Err(EscrowError::InvalidTransition {
                from: self.status,
                to: target,
            })
        }
    }
}
