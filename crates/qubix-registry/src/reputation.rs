//! Reputation scoring for compute providers.
//!
//! Scores are integers in `[0, max]`. A success raises the score by a small
//! reward, a failure lowers it by a larger penalty, so unreliable providers
//! lose standing faster than they can rebuild it.

use serde::{Deserialize, Serialize};

/// Parameters of the scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationPolicy {
    /// Score of a newly registered provider.
    pub initial: u32,
    /// Upper bound of the score.
    pub max: u32,
    /// Added per successful job.
    pub success_reward: u32,
    /// Subtracted per failed job.
    pub failure_penalty: u32,
}

impl ReputationPolicy {
    /// Default upper bound.
    pub const MAX_SCORE: u32 = 1000;

    /// Default starting score (half of the maximum).
    pub const INITIAL_SCORE: u32 = 500;

    /// Default reward per success.
    pub const SUCCESS_REWARD: u32 = 10;

    /// Default penalty per failure.
    pub const FAILURE_PENALTY: u32 = 20;
}

impl Default for ReputationPolicy {
    fn default() -> Self {
        Self {
            initial: Self::INITIAL_SCORE,
            max: Self::MAX_SCORE,
            success_reward: Self::SUCCESS_REWARD,
            failure_penalty: Self::FAILURE_PENALTY,
        }
    }
}

/// A provider's score and job counters.
///
/// `total_jobs == completed_jobs + failed_jobs` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reputation {
    score: u32,
    total_jobs: u64,
    completed_jobs: u64,
    failed_jobs: u64,
}

impl Reputation {
    /// Creates a reputation at the policy's initial score.
    #[must_use]
    pub fn new(policy: &ReputationPolicy) -> Self {
        Self {
            score: policy.initial.min(policy.max),
            total_jobs: 0,
            completed_jobs: 0,
            failed_jobs: 0,
        }
    }

    /// Records a successful job, capping the score at `policy.max`.
    pub fn record_success(&mut self, policy: &ReputationPolicy) {
        self.total_jobs = self.total_jobs.saturating_add(1);
        self.completed_jobs = self.completed_jobs.saturating_add(1);
        self.score = self
            .score
            .saturating_add(policy.success_reward)
            .min(policy.max);
    }

    /// Records a failed job, flooring the score at zero.
    pub fn record_failure(&mut self, policy: &ReputationPolicy) {
        self.total_jobs = self.total_jobs.saturating_add(1);
        self.failed_jobs = self.failed_jobs.saturating_add(1);
        self.score = self.score.saturating_sub(policy.failure_penalty);
    }

    /// Records an outcome and returns the new score.
    pub fn record(&mut self, success: bool, policy: &ReputationPolicy) -> u32 {
        if success {
            self.record_success(policy);
        } else {
            self.record_failure(policy);
        }
        self.score
    }

    /// The current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Jobs recorded.
    #[must_use]
    pub const fn total_jobs(&self) -> u64 {
        self.total_jobs
    }

    /// Successful jobs recorded.
    #[must_use]
    pub const fn completed_jobs(&self) -> u64 {
        self.completed_jobs
    }

    /// Failed jobs recorded.
    #[must_use]
    pub const fn failed_jobs(&self) -> u64 {
        self.failed_jobs
    }

    /// Share of successful jobs in whole percent, or `None` with no history.
    #[must_use]
    pub const fn success_rate_percent(&self) -> Option<u64> {
        if self.total_jobs == 0 {
            None
        } else {
            Some(self.completed_jobs * 100 / self.total_jobs)
        }
    }
}

impl Default for Reputation {
    fn default() -> Self {
        Self::new(&ReputationPolicy::default())
    }
}
