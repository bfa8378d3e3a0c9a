//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use qubix_core::{Address, Amount, Tick};
use qubix_escrow::{EscrowStats, Job, JobStatus};
use qubix_registry::Provider;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Simple message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
    /// Whether this is a success message.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    /// Create an informational message.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.success {
            writeln!(writer, "✓ {}", self.message)?;
        } else {
            writeln!(writer, "{}", self.message)?;
        }
        Ok(())
    }
}

/// A freshly generated key pair.
#[derive(Debug, Clone, Serialize)]
pub struct KeyPair {
    /// Address derived from the public key.
    pub address: Address,
    /// Base58 secret key.
    pub secret: String,
}

impl TableDisplay for KeyPair {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Address:  {}", self.address)?;
        writeln!(writer, "Secret:   {}", self.secret)?;
        writeln!(writer)?;
        writeln!(writer, "Keep the secret safe; it cannot be recovered.")?;
        Ok(())
    }
}

/// One account balance.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceView {
    /// Account.
    pub address: Address,
    /// Balance.
    pub balance: Amount,
    /// Tick the balance was read at.
    pub tick: Tick,
}

impl TableDisplay for BalanceView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}  {}  ({})", self.address, self.balance, self.tick)?;
        Ok(())
    }
}

/// One job with its index.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    /// Job index.
    pub index: usize,
    /// Job record.
    #[serde(flatten)]
    pub job: Job,
}

impl JobView {
    /// Pairs a job with its index.
    #[must_use]
    pub fn new(index: usize, job: &Job) -> Self {
        Self {
            index,
            job: job.clone(),
        }
    }
}

impl TableDisplay for JobView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let job = &self.job;
        writeln!(writer, "Job {}: {}", self.index, job.job_id)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Status:      {}", job.status)?;
        writeln!(writer, "Amount:      {}", job.amount)?;
        writeln!(writer, "Consumer:    {}", job.consumer)?;
        writeln!(writer, "Provider:    {}", job.provider)?;
        writeln!(writer, "Created:     {}", job.created_at)?;
        writeln!(writer, "Deadline:    {}", job.deadline)?;
        if let Some(fee) = job.fee {
            writeln!(writer, "Fee burned:  {fee}")?;
        }
        if let Some(settled_at) = job.settled_at {
            writeln!(writer, "Settled:     {settled_at}")?;
        }
        Ok(())
    }
}

/// A list of jobs.
#[derive(Debug, Clone, Serialize)]
pub struct JobList {
    /// Jobs with their indices.
    pub jobs: Vec<JobView>,
}

impl TableDisplay for JobList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.jobs.is_empty() {
            writeln!(writer, "No jobs")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:>5}  {:<24}  {:<10}  {:>14}  {:>10}  {:<12}",
            "INDEX", "JOB ID", "STATUS", "AMOUNT", "DEADLINE", "PROVIDER"
        )?;
        writeln!(writer, "{}", "─".repeat(84))?;

        for view in &self.jobs {
            let job = &view.job;
            writeln!(
                writer,
                "{:>5}  {:<24}  {:<10}  {:>14}  {:>10}  {:<12}",
                view.index,
                truncate(job.job_id.as_str(), 24),
                status_label(job.status),
                job.amount.to_string(),
                job.deadline.value(),
                truncate(job.provider.as_str(), 12)
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} job(s)", self.jobs.len())?;
        Ok(())
    }
}

/// One provider with its index.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    /// Provider index.
    pub index: usize,
    /// Provider record.
    #[serde(flatten)]
    pub provider: Provider,
}

impl ProviderView {
    /// Pairs a provider with its index.
    #[must_use]
    pub fn new(index: usize, provider: &Provider) -> Self {
        Self {
            index,
            provider: provider.clone(),
        }
    }
}

/// A list of providers.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderList {
    /// Providers with their indices.
    pub providers: Vec<ProviderView>,
}

impl TableDisplay for ProviderList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.providers.is_empty() {
            writeln!(writer, "No providers registered")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:>5}  {:<12}  {:>8}  {:>10}  {:>5}  {:>7}  {:>12}  {:<6}",
            "INDEX", "ADDRESS", "TFLOPS", "PRICE/H", "SCORE", "JOBS", "STAKE", "ACTIVE"
        )?;
        writeln!(writer, "{}", "─".repeat(82))?;

        for view in &self.providers {
            let p = &view.provider;
            writeln!(
                writer,
                "{:>5}  {:<12}  {:>8}  {:>10}  {:>5}  {:>7}  {:>12}  {:<6}",
                view.index,
                truncate(p.address.as_str(), 12),
                p.compute_power,
                p.price_per_hour.to_string(),
                p.reputation.score(),
                p.reputation.total_jobs(),
                p.staked_amount.to_string(),
                if p.is_active { "yes" } else { "no" }
            )?;
        }

        writeln!(writer)?;
        writeln!(writer, "Total: {} provider(s)", self.providers.len())?;
        Ok(())
    }
}

/// A provider's score.
#[derive(Debug, Clone, Serialize)]
pub struct ReputationView {
    /// Provider index.
    pub index: usize,
    /// Score; 0 for an unknown index.
    pub score: u32,
    /// Completed share of recorded jobs, if any were recorded.
    pub success_rate_percent: Option<u64>,
}

impl TableDisplay for ReputationView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        write!(writer, "Provider {}: reputation {}", self.index, self.score)?;
        match self.success_rate_percent {
            Some(rate) => writeln!(writer, " ({rate}% success)")?,
            None => writeln!(writer)?,
        }
        Ok(())
    }
}

/// Funds moved by a completion.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementReport {
    /// Job index.
    pub index: usize,
    /// Paid to the provider.
    pub payout: Amount,
    /// Burned.
    pub fee: Amount,
    /// Provider score after the outcome was recorded.
    pub reputation: Option<u32>,
}

impl TableDisplay for SettlementReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "✓ Job {} completed", self.index)?;
        writeln!(writer, "  Paid to provider:  {}", self.payout)?;
        writeln!(writer, "  Fee burned:        {}", self.fee)?;
        if let Some(score) = self.reputation {
            writeln!(writer, "  Provider score:    {score}")?;
        }
        Ok(())
    }
}

/// Funds returned by a refund.
#[derive(Debug, Clone, Serialize)]
pub struct RefundReport {
    /// Job index.
    pub index: usize,
    /// Returned to the consumer.
    pub refunded: Amount,
    /// Provider score after the outcome was recorded.
    pub reputation: Option<u32>,
}

impl TableDisplay for RefundReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "✓ Job {} refunded", self.index)?;
        writeln!(writer, "  Returned to consumer:  {}", self.refunded)?;
        if let Some(score) = self.reputation {
            writeln!(writer, "  Provider score:        {score}")?;
        }
        Ok(())
    }
}

/// Marketplace totals.
#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    /// Current tick.
    pub tick: Tick,
    /// Escrow ledger totals.
    pub escrow: EscrowStats,
    /// Registered providers.
    pub providers: usize,
    /// Providers accepting jobs.
    pub active_providers: usize,
    /// Stake held by the registry.
    pub total_staked: Amount,
}

impl TableDisplay for StatsView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let e = &self.escrow;
        writeln!(writer, "Marketplace Stats ({})", self.tick)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Jobs")?;
        writeln!(writer, "  Total:          {}", e.total_jobs)?;
        writeln!(writer, "  Pending:        {}", e.pending)?;
        writeln!(writer, "  Active:         {}", e.active)?;
        writeln!(writer, "  Completed:      {}", e.completed)?;
        writeln!(writer, "  Disputed:       {}", e.disputed)?;
        writeln!(writer, "  Refunded:       {}", e.refunded)?;
        writeln!(writer)?;
        writeln!(writer, "Value")?;
        writeln!(writer, "  Locked:         {}", e.locked_value)?;
        writeln!(writer, "  Released:       {}", e.released_value)?;
        writeln!(writer, "  Burned:         {}", e.burned_value)?;
        writeln!(writer, "  Refunded:       {}", e.refunded_value)?;
        writeln!(writer)?;
        writeln!(writer, "Providers")?;
        writeln!(writer, "  Registered:     {}", self.providers)?;
        writeln!(writer, "  Active:         {}", self.active_providers)?;
        writeln!(writer, "  Staked:         {}", self.total_staked)?;
        Ok(())
    }
}

const fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Active => "active",
        JobStatus::Completed => "completed",
        JobStatus::Disputed => "disputed",
        JobStatus::Refunded => "refunded",
    }
}

/// Truncate a string to a maximum length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        format!("{}...", &s[..max_len - 3])
    } else {
        s[..max_len].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qubix_core::JobId;
    use qubix_registry::ReputationPolicy;

    fn job() -> Job {
        Job::new(
            JobId::new("render-7").unwrap(),
            Address::from_public_key(&[1; 32]),
            Address::from_public_key(&[2; 32]),
            Amount::new(1000),
            Tick::new(3),
            Tick::new(13),
        )
        .unwrap()
    }

    #[test]
    fn output_format_default_is_table() {
        let fmt = OutputFormat::default();
        assert_eq!(fmt.format(), Format::Table);
        assert!(!fmt.is_json());
    }

    #[test]
    fn job_view_json_is_flat() {
        let fmt = OutputFormat::new(Format::Json);
        let output = fmt.to_string(&JobView::new(2, &job())).unwrap();

        assert!(output.contains("\"index\": 2"));
        assert!(output.contains("\"job_id\": \"render-7\""));
        assert!(output.contains("\"amount\": 1000"));
        assert!(output.contains("\"status\": \"Pending\""));
    }

    #[test]
    fn job_view_table() {
        let output = OutputFormat::default()
            .to_string(&JobView::new(0, &job()))
            .unwrap();
        assert!(output.contains("Job 0: render-7"));
        assert!(output.contains("Amount:      1000 QU"));
        assert!(output.contains("Deadline:    tick 13"));
        assert!(!output.contains("Fee burned"));
    }

    #[test]
    fn job_list_table() {
        let list = JobList {
            jobs: vec![JobView::new(0, &job()), JobView::new(1, &job())],
        };
        let output = OutputFormat::default().to_string(&list).unwrap();
        assert!(output.contains("INDEX"));
        assert!(output.contains("pending"));
        assert!(output.contains("Total: 2 job(s)"));
    }

    #[test]
    fn empty_lists() {
        let fmt = OutputFormat::default();
        assert!(fmt
            .to_string(&JobList { jobs: vec![] })
            .unwrap()
            .contains("No jobs"));
        assert!(fmt
            .to_string(&ProviderList { providers: vec![] })
            .unwrap()
            .contains("No providers registered"));
    }

    #[test]
    fn provider_list_table() {
        let provider = Provider::new(
            Address::from_public_key(&[3; 32]),
            250,
            Amount::new(12),
            Amount::new(1500),
            Tick::new(1),
            &ReputationPolicy::default(),
        );
        let list = ProviderList {
            providers: vec![ProviderView::new(0, &provider)],
        };
        let output = OutputFormat::default().to_string(&list).unwrap();
        assert!(output.contains("500"));
        assert!(output.contains("1500 QU"));
        assert!(output.contains("yes"));
    }

    #[test]
    fn settlement_report_table() {
        let report = SettlementReport {
            index: 3,
            payout: Amount::new(970),
            fee: Amount::new(30),
            reputation: Some(510),
        };
        let output = OutputFormat::default().to_string(&report).unwrap();
        assert!(output.contains("✓ Job 3 completed"));
        assert!(output.contains("970 QU"));
        assert!(output.contains("Provider score:    510"));
    }

    #[test]
    fn reputation_view_without_history() {
        let view = ReputationView {
            index: 1,
            score: 500,
            success_rate_percent: None,
        };
        let output = OutputFormat::default().to_string(&view).unwrap();
        assert_eq!(output, "Provider 1: reputation 500\n");
    }

    #[test]
    fn message_json_omits_false_success() {
        let fmt = OutputFormat::new(Format::Json);
        let output = fmt.to_string(&Message::info("hello")).unwrap();
        assert!(!output.contains("success"));
    }

    #[test]
    fn truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hello", 5), "hello");
    }
}
