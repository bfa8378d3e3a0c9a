//! The escrow ledger.
//!
//! Jobs are stored append-only; a job's index is its permanent identifier.
//! Every operation checks authorization and status before any fund movement,
//! and rolls the status back if the paired host call fails.

use qubix_core::{Address, Amount, Host, HostError, JobId, Tick};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::EscrowError;
use crate::job::{Job, JobStatus};
use crate::settlement::{FeeSplit, JobOutcome, Settlement};

/// Default maximum number of jobs.
pub const DEFAULT_MAX_JOBS: usize = 1000;

/// Default protocol fee, in percent of the escrowed amount.
pub const DEFAULT_FEE_PERCENT: u64 = 3;

/// Owns job records and the custody account holding their funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowLedger {
    custody: Address,
    capacity: usize,
    fee_percent: u64,
    jobs: Vec<Job>,
}

/// Aggregate view over all jobs in the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowStats {
    /// Number of jobs ever created.
    pub total_jobs: usize,
    /// Jobs awaiting a start.
    pub pending: usize,
    /// Jobs in progress.
    pub active: usize,
    /// Jobs paid out.
    pub completed: usize,
    /// Jobs under dispute.
    pub disputed: usize,
    /// Jobs refunded to the consumer.
    pub refunded: usize,
    /// Value currently held in custody.
    pub locked_value: Amount,
    /// Value paid to providers.
    pub released_value: Amount,
    /// Value burned as fees.
    pub burned_value: Amount,
    /// Value returned to consumers.
    pub refunded_value: Amount,
}

impl EscrowLedger {
    /// Creates an empty ledger with the default capacity and fee.
    #[must_use]
    pub const fn new(custody: Address) -> Self {
        Self::with_limits(custody, DEFAULT_MAX_JOBS, DEFAULT_FEE_PERCENT)
    }

    /// Creates an empty ledger with an explicit capacity and fee percentage.
    #[must_use]
    pub const fn with_limits(custody: Address, capacity: usize, fee_percent: u64) -> Self {
        Self {
            custody,
            capacity,
            fee_percent,
            jobs: Vec::new(),
        }
    }

    /// Account that holds escrowed funds.
    #[must_use]
    pub const fn custody(&self) -> Address {
        self.custody
    }

    /// Maximum number of jobs.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fee percentage burned on completion.
    #[must_use]
    pub const fn fee_percent(&self) -> u64 {
        self.fee_percent
    }

    /// Number of jobs stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True if no job has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// The job at `index`.
    #[must_use]
    pub fn job(&self, index: usize) -> Option<&Job> {
        self.jobs.get(index)
    }

    /// All jobs in creation order.
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Jobs where `party` is consumer or provider, with their indices.
    pub fn jobs_for<'a>(&'a self, party: &'a Address) -> impl Iterator<Item = (usize, &'a Job)> {
        self.jobs
            .iter()
            .enumerate()
            .filter(move |(_, job)| job.is_party(party))
    }

    /// Creates a job and locks `amount` from the consumer into custody.
    ///
    /// The caller must be the consumer. Returns the new job's index.
    ///
    /// # Errors
    ///
    /// - `CapacityExceeded` if the store is full
    /// - `Unauthorized` if the caller is not `consumer`
    /// - `CustodyParty` if either party is the custody account
    /// - `InvalidDeadline` if `deadline` is before the current tick
    /// - `Host` if the consumer cannot cover `amount`; no job is stored
    pub fn create<H: Host>(
        &mut self,
        host: &mut H,
        job_id: JobId,
        consumer: Address,
        provider: Address,
        amount: Amount,
        deadline: Tick,
    ) -> Result<usize, EscrowError> {
        if self.jobs.len() >= self.capacity {
            warn!(capacity = self.capacity, %job_id, "job store at capacity");
            return Err(EscrowError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let caller = host.caller();
        if caller != consumer {
            debug!(%caller, %consumer, "create refused: caller is not the consumer");
            return Err(EscrowError::unauthorized(caller, "create a job for another consumer"));
        }
        if let Some(address) = [consumer, provider].into_iter().find(|a| *a == self.custody) {
            warn!(%address, "create refused: custody named as a party");
            return Err(EscrowError::CustodyParty { address });
        }

        let job = Job::new(job_id, consumer, provider, amount, host.current_tick(), deadline)?;
        host.transfer(&consumer, &self.custody, amount)?;

        let index = self.jobs.len();
        info!(
            index,
            job_id = %job.job_id,
            %consumer,
            %provider,
            %amount,
            deadline = job.deadline.value(),
            "job created, funds locked"
        );
        self.jobs.push(job);
        Ok(index)
    }

    /// Marks a pending job as active. Only the provider may start it.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` if no job exists at `index`
    /// - `Unauthorized` if the caller is not the provider
    /// - `AlreadyCompleted` if the job was paid out
    /// - `InvalidTransition` if the job is not pending
    pub fn start<H: Host>(&mut self, host: &H, index: usize) -> Result<(), EscrowError> {
        let caller = host.caller();
        let job = self.job_mut(index)?;

        if job.provider != caller {
            debug!(index, %caller, "start refused: caller is not the provider");
            return Err(EscrowError::unauthorized(caller, "start this job"));
        }
        if job.status == JobStatus::Completed {
            return Err(EscrowError::AlreadyCompleted { index });
        }

        job.transition_to(JobStatus::Active)?;
        info!(index, job_id = %job.job_id, "job started");
        Ok(())
    }

    /// Completes a job: pays the provider and burns the protocol fee.
    ///
    /// The status is checked and set before funds move. If the payout fails
    /// the previous status is restored, so a job pays out at most once.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` if no job exists at `index`
    /// - `Unauthorized` if the caller is not the provider
    /// - `AlreadyCompleted` if the job was already paid out
    /// - `InvalidTransition` if the job is disputed or refunded
    /// - `Host` if custody cannot cover the payout
    /// - `SettlementIncomplete` if the fee burn and the payout reversal both
    ///   failed; the job is left `Completed` with no fee recorded
    pub fn complete<H: Host>(&mut self, host: &mut H, index: usize) -> Result<Settlement, EscrowError> {
        let caller = host.caller();
        let custody = self.custody;
        let fee_percent = self.fee_percent;
        let job = self.job_mut(index)?;

        if job.provider != caller {
            debug!(index, %caller, "complete refused: caller is not the provider");
            return Err(EscrowError::unauthorized(caller, "complete this job"));
        }
        if job.status == JobStatus::Completed {
            warn!(index, job_id = %job.job_id, "repeat completion rejected");
            return Err(EscrowError::AlreadyCompleted { index });
        }

        let held = host.balance(&custody);
        if held < job.amount {
            return Err(HostError::insufficient_balance(custody, held, job.amount).into());
        }

        let split = FeeSplit::new(job.amount, fee_percent);
        let previous = job.transition_to(JobStatus::Completed)?;

        match pay_out(host, &custody, &job.provider, split) {
            Ok(()) => {}
            Err(PayoutError::Reverted(err)) => {
                job.status = previous;
                warn!(index, error = %err, "payout failed, status restored");
                return Err(err.into());
            }
            Err(PayoutError::Stranded(error)) => {
                job.settled_at = Some(host.current_tick());
                error!(index, %error, "payout kept by provider, fee not burned");
                return Err(EscrowError::SettlementIncomplete { index, error });
            }
        }

        job.fee = Some(split.fee);
        job.settled_at = Some(host.current_tick());
        info!(
            index,
            job_id = %job.job_id,
            provider = %job.provider,
            payout = %split.payout,
            fee = %split.fee,
            "job completed, fee burned"
        );

        Ok(Settlement {
            split,
            outcome: JobOutcome {
                job_index: index,
                job_id: job.job_id.clone(),
                provider: job.provider,
                success: true,
            },
        })
    }

    /// Flags a job as disputed. Either party may dispute; no funds move.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` if no job exists at `index`
    /// - `Unauthorized` if the caller is neither consumer nor provider
    /// - `AlreadyCompleted` if the job was paid out
    /// - `InvalidTransition` if the job is refunded or already disputed
    pub fn dispute<H: Host>(&mut self, host: &H, index: usize) -> Result<(), EscrowError> {
        let caller = host.caller();
        let job = self.job_mut(index)?;

        if !job.is_party(&caller) {
            debug!(index, %caller, "dispute refused: caller is not a party");
            return Err(EscrowError::unauthorized(caller, "dispute this job"));
        }
        if job.status == JobStatus::Completed {
            return Err(EscrowError::AlreadyCompleted { index });
        }

        job.transition_to(JobStatus::Disputed)?;
        info!(index, job_id = %job.job_id, raised_by = %caller, "job disputed");
        Ok(())
    }

    /// Returns the escrowed amount to the consumer once the deadline passes.
    ///
    /// Anyone may trigger a refund. The job ends in the terminal
    /// [`JobStatus::Refunded`] state and the returned outcome records a
    /// failure for the provider.
    ///
    /// # Errors
    ///
    /// - `InvalidIndex` if no job exists at `index`
    /// - `AlreadyCompleted` if the job was paid out
    /// - `DeadlineNotReached` if the current tick is before the deadline
    /// - `InvalidTransition` if the job was already refunded
    /// - `Host` if custody cannot cover the refund; the status is restored
    pub fn refund<H: Host>(&mut self, host: &mut H, index: usize) -> Result<JobOutcome, EscrowError> {
        let now = host.current_tick();
        let custody = self.custody;
        let job = self.job_mut(index)?;

        if job.status == JobStatus::Completed {
            return Err(EscrowError::AlreadyCompleted { index });
        }
        if !now.has_reached(job.deadline) {
            return Err(EscrowError::DeadlineNotReached {
                now,
                deadline: job.deadline,
            });
        }

        let previous = job.transition_to(JobStatus::Refunded)?;
        if let Err(err) = host.transfer(&custody, &job.consumer, job.amount) {
            job.status = previous;
            warn!(index, error = %err, "refund failed, status restored");
            return Err(err.into());
        }

        job.settled_at = Some(now);
        info!(
            index,
            job_id = %job.job_id,
            consumer = %job.consumer,
            amount = %job.amount,
            "job refunded"
        );

        Ok(JobOutcome {
            job_index: index,
            job_id: job.job_id.clone(),
            provider: job.provider,
            success: false,
        })
    }

    /// Counts and value totals across every job.
    #[must_use]
    pub fn stats(&self) -> EscrowStats {
        let mut stats = EscrowStats {
            total_jobs: self.jobs.len(),
            ..EscrowStats::default()
        };

        for job in &self.jobs {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Active => stats.active += 1,
                JobStatus::Disputed => stats.disputed += 1,
                JobStatus::Completed => {
                    stats.completed += 1;
                    let fee = job.fee.unwrap_or_default();
                    stats.burned_value = stats.burned_value.saturating_add(fee);
                    stats.released_value = stats
                        .released_value
                        .saturating_add(job.amount.checked_sub(fee).unwrap_or_default());
                }
                JobStatus::Refunded => {
                    stats.refunded += 1;
                    stats.refunded_value = stats.refunded_value.saturating_add(job.amount);
                }
            }
            if job.status.holds_funds() {
                stats.locked_value = stats.locked_value.saturating_add(job.amount);
            }
        }

        stats
    }

    fn job_mut(&mut self, index: usize) -> Result<&mut Job, EscrowError> {
        let count = self.jobs.len();
        self.jobs
            .get_mut(index)
            .ok_or(EscrowError::InvalidIndex { index, count })
    }
}

/// How a failed payout left the books.
enum PayoutError {
    /// Nothing moved, or the payout was clawed back.
    Reverted(HostError),
    /// The provider holds the payout and the fee is still in custody.
    Stranded(HostError),
}

/// Moves a completion's funds out of custody.
///
/// The caller has checked that custody covers `payout + fee`. Should the burn
/// still fail, the payout is clawed back so the job can be restored intact.
fn pay_out<H: Host>(
    host: &mut H,
    custody: &Address,
    provider: &Address,
    split: FeeSplit,
) -> Result<(), PayoutError> {
    host.transfer(custody, provider, split.payout)
        .map_err(PayoutError::Reverted)?;
    if let Err(err) = host.burn(custody, split.fee) {
        if let Err(reverse) = host.transfer(provider, custody, split.payout) {
            warn!(error = %reverse, "failed to reverse payout after burn failure");
            return Err(PayoutError::Stranded(err));
        }
        return Err(PayoutError::Reverted(err));
    }
    Ok(())
}
