//! Job command implementation.
//!
//! Completion and refund forward the job outcome to the provider registry
//! when the provider is registered.

use std::io::Write;

use qubix_core::{Amount, Host, JobId};
use tracing::info;
use uuid::Uuid;

use super::parse_address;
use crate::cli::JobCommands;
use crate::error::CliError;
use crate::output::{JobList, JobView, Message, OutputFormat, RefundReport, SettlementReport};
use crate::session::Session;

/// Job command executor.
pub struct JobCommand<'a> {
    session: &'a mut Session,
}

impl<'a> JobCommand<'a> {
    /// Create a job command over `session`.
    #[must_use]
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Execute a job subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument does not parse or the marketplace
    /// rejects the operation.
    pub fn execute<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        command: &JobCommands,
    ) -> Result<(), CliError> {
        match command {
            JobCommands::Create {
                provider,
                amount,
                ttl,
                id,
            } => {
                let index = self.create(provider, amount, *ttl, id.as_deref())?;
                let job = self.job(index)?;
                format.write(
                    writer,
                    &Message::success(format!(
                        "Job {index} ({}) created, {} locked until {}",
                        job.job.job_id, job.job.amount, job.job.deadline
                    )),
                )?;
            }
            JobCommands::Start { index } => {
                self.session.caller()?;
                self.session.market_mut().start_job(*index)?;
                format.write(writer, &Message::success(format!("Job {index} started")))?;
            }
            JobCommands::Complete { index } => {
                let report = self.complete(*index)?;
                format.write(writer, &report)?;
            }
            JobCommands::Dispute { index } => {
                self.session.caller()?;
                self.session.market_mut().dispute_job(*index)?;
                format.write(writer, &Message::success(format!("Job {index} disputed")))?;
            }
            JobCommands::Refund { index } => {
                let report = self.refund(*index)?;
                format.write(writer, &report)?;
            }
            JobCommands::Show { index } => {
                format.write(writer, &self.job(*index)?)?;
            }
            JobCommands::List { party } => {
                let list = self.list(party.as_deref())?;
                format.write(writer, &list)?;
            }
        }
        Ok(())
    }

    fn create(
        &mut self,
        provider: &str,
        amount: &str,
        ttl: u64,
        id: Option<&str>,
    ) -> Result<usize, CliError> {
        let consumer = self.session.caller()?;
        let provider = parse_address(provider)?;
        let amount: Amount = amount.parse()?;
        let job_id = match id {
            Some(id) => JobId::new(id)?,
            None => JobId::new(Uuid::new_v4().simple().to_string())?,
        };

        let market = self.session.market_mut();
        let deadline = market.host().current_tick().after(ttl);
        Ok(market.create_job(job_id, consumer, provider, amount, deadline)?)
    }

    fn complete(&mut self, index: usize) -> Result<SettlementReport, CliError> {
        self.session.caller()?;
        let market = self.session.market_mut();
        let settlement = market.complete_job(index)?;
        let reputation = market.forward_outcome(&settlement.outcome);
        info!(index, reputation = ?reputation, "completion settled");
        Ok(SettlementReport {
            index,
            payout: settlement.split.payout,
            fee: settlement.split.fee,
            reputation,
        })
    }

    fn refund(&mut self, index: usize) -> Result<RefundReport, CliError> {
        let market = self.session.market_mut();
        let outcome = market.refund_job(index)?;
        let refunded = market
            .escrow()
            .job(outcome.job_index)
            .map_or(Amount::ZERO, |job| job.amount);
        let reputation = market.forward_outcome(&outcome);
        info!(index, %refunded, reputation = ?reputation, "refund settled");
        Ok(RefundReport {
            index,
            refunded,
            reputation,
        })
    }

    fn job(&self, index: usize) -> Result<JobView, CliError> {
        self.session
            .market()
            .escrow()
            .job(index)
            .map(|job| JobView::new(index, job))
            .ok_or(CliError::NotFound { kind: "job", index })
    }

    fn list(&self, party: Option<&str>) -> Result<JobList, CliError> {
        let escrow = self.session.market().escrow();
        let jobs = match party {
            Some(raw) => {
                let party = parse_address(raw)?;
                escrow
                    .jobs_for(&party)
                    .map(|(index, job)| JobView::new(index, job))
                    .collect()
            }
            None => escrow
                .jobs()
                .iter()
                .enumerate()
                .map(|(index, job)| JobView::new(index, job))
                .collect(),
        };
        Ok(JobList { jobs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use qubix_core::Address;
    use qubix_escrow::JobStatus;
    use qubix_market::MarketConfig;

    fn consumer() -> Address {
        Address::from_public_key(&[1; 32])
    }

    fn provider() -> Address {
        Address::from_public_key(&[2; 32])
    }

    fn session(dir: &tempfile::TempDir) -> Session {
        let mut session =
            Session::create(&dir.path().join("state.json"), MarketConfig::default(), false)
                .unwrap();
        let host = session.market_mut().host_mut();
        host.mint(consumer(), Amount::new(5000)).unwrap();
        host.mint(provider(), Amount::new(5000)).unwrap();
        session
    }

    fn run(session: &mut Session, caller: Option<Address>, command: JobCommands) -> String {
        session
            .authenticate(caller.as_ref().map(Address::as_str), None)
            .unwrap();
        let mut out = Vec::new();
        JobCommand::new(session)
            .execute(&mut out, &OutputFormat::default(), &command)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn create(session: &mut Session, amount: &str) {
        run(
            session,
            Some(consumer()),
            JobCommands::Create {
                provider: provider().to_string(),
                amount: amount.into(),
                ttl: 10,
                id: None,
            },
        );
    }

    #[test]
    fn create_generates_an_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        create(&mut session, "1000");

        let job = session.market().escrow().job(0).unwrap();
        assert_eq!(job.job_id.as_str().len(), 32);
        assert_eq!(job.deadline.value(), 10);
    }

    #[test]
    fn complete_reports_split_without_registration() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        create(&mut session, "1000");

        let output = run(&mut session, Some(provider()), JobCommands::Complete { index: 0 });
        assert!(output.contains("970 QU"));
        assert!(output.contains("30 QU"));
        assert!(!output.contains("Provider score"));
    }

    #[test]
    fn complete_updates_registered_provider() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        session.authenticate(Some(provider().as_str()), None).unwrap();
        session
            .market_mut()
            .register_provider(provider(), 10, Amount::new(1), Amount::new(1000))
            .unwrap();
        create(&mut session, "1000");

        let output = run(&mut session, Some(provider()), JobCommands::Complete { index: 0 });
        assert!(output.contains("Provider score:    510"));
        assert_eq!(session.market().provider_reputation(0), 510);
    }

    #[test]
    fn refund_needs_no_caller() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        create(&mut session, "700");
        session.market_mut().host_mut().advance(10);

        let output = run(&mut session, None, JobCommands::Refund { index: 0 });
        assert!(output.contains("Returned to consumer:  700 QU"));
        assert_eq!(
            session.market().escrow().job(0).map(|j| j.status),
            Some(JobStatus::Refunded)
        );
    }

    #[test]
    fn start_requires_caller() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        create(&mut session, "100");
        session.authenticate(None, None).unwrap();

        let err = JobCommand::new(&mut session)
            .execute(
                &mut Vec::new(),
                &OutputFormat::default(),
                &JobCommands::Start { index: 0 },
            )
            .unwrap_err();
        assert!(matches!(err, CliError::NoCaller));
    }

    #[test]
    fn show_missing_job() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        let err = JobCommand::new(&mut session)
            .execute(
                &mut Vec::new(),
                &OutputFormat::default(),
                &JobCommands::Show { index: 3 },
            )
            .unwrap_err();
        assert!(matches!(err, CliError::NotFound { kind: "job", index: 3 }));
    }

    #[test]
    fn list_filters_by_party() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session(&dir);
        create(&mut session, "100");
        create(&mut session, "200");

        session.authenticate(None, None).unwrap();
        let mut out = Vec::new();
        JobCommand::new(&mut session)
            .execute(
                &mut out,
                &OutputFormat::new(Format::Json),
                &JobCommands::List {
                    party: Some(Address::contract(77).to_string()),
                },
            )
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["jobs"].as_array().map(Vec::len), Some(0));

        let output = run(&mut session, None, JobCommands::List { party: None });
        assert!(output.contains("Total: 2 job(s)"));
    }
}
