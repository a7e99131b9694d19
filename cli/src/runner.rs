//! Executes scenario scripts against a freshly configured engine.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{parse_amount, resolve, DaoConfig};
use crate::error::{CliError, StepError};
use crate::script::{Script, Step};
use dao_governance::{
    EventRecorder, GovernanceEngine, GovernanceEvent, GovernanceParams, Proposal, ProposalStatus,
};
use dao_nullables::NullClock;
use dao_token::{Role, Token, TokenCall, TokenLedger};
use dao_types::{Address, Clock, ProposalId, SystemClock, Timestamp, TokenAmount};
use dao_utils::format_duration;

/// Totals for a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub steps: usize,
    pub failed: usize,
}

/// One `--json` line per step.
#[derive(Serialize)]
struct StepLine<'a> {
    step: usize,
    action: &'static str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    events: &'a [GovernanceEvent],
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: Summary<'a>,
}

#[derive(Serialize)]
struct Summary<'a> {
    steps: usize,
    failed: usize,
    now: Timestamp,
    total_supply: TokenAmount,
    custody: TokenAmount,
    proposals: Vec<&'a Proposal>,
}

/// Owns an engine over the in-memory token and a virtual clock.
pub struct Runner {
    engine: GovernanceEngine<Token>,
    clock: Arc<NullClock>,
    events: EventRecorder,
    /// Address → label, for readable output.
    names: HashMap<Address, String>,
}

impl Runner {
    /// Deploy the token and governance engine described by `config`, fund
    /// every configured account and set its allowance.
    pub fn from_config(config: &DaoConfig) -> Result<Self, CliError> {
        let mut names = HashMap::new();
        let mut label = |s: &str| {
            let address = resolve(s);
            names.entry(address).or_insert_with(|| s.to_string());
            address
        };

        let token_address = label(&config.token.address);
        let dao = label(&config.governance.address);
        let owner = label(&config.governance.owner);
        let chair = label(&config.governance.chair);
        let supply = parse_amount("token.supply", &config.token.supply)?;

        let mut token = Token::new(
            token_address,
            config.token.name.clone(),
            config.token.symbol.clone(),
            supply,
            owner,
        );
        for account in &config.accounts {
            let address = label(&account.name);
            let balance = parse_amount(&format!("accounts.{}.balance", account.name), &account.balance)?;
            let allowance = match &account.approve {
                Some(value) => parse_amount(&format!("accounts.{}.approve", account.name), value)?,
                None => balance,
            };
            token
                .transfer(&owner, &address, balance)
                .map_err(|e| CliError::Setup(format!("funding {}: {e}", account.name)))?;
            token.approve(&address, &dao, allowance);
        }

        let start = config
            .start_time
            .unwrap_or_else(|| SystemClock.now().as_secs());
        let clock = Arc::new(NullClock::new(start));
        let params = GovernanceParams {
            chair,
            owner,
            quorum_percentage: config.governance.quorum_percentage,
            debating_period_secs: config.governance.debating_period_secs,
        };
        let mut engine = GovernanceEngine::new(dao, params, token, clock.clone())
            .map_err(|e| CliError::Setup(e.to_string()))?;
        let events = EventRecorder::new();
        engine.subscribe(events.listener());

        Ok(Self {
            engine,
            clock,
            events,
            names,
        })
    }

    pub fn engine(&self) -> &GovernanceEngine<Token> {
        &self.engine
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Run every step in order. A rejected step is reported and the run moves
    /// on; only output failures abort.
    pub fn run(
        &mut self,
        script: &Script,
        out: &mut impl Write,
        json: bool,
    ) -> Result<RunReport, CliError> {
        let mut report = RunReport::default();
        for (index, step) in script.steps.iter().enumerate() {
            let n = index + 1;
            let result = self.apply(step);
            let events = self.events.take();
            report.steps += 1;
            if let Err(err) = &result {
                report.failed += 1;
                tracing::warn!(step = n, action = step.action(), error = %err, "step rejected");
            }
            if json {
                self.write_json_step(out, n, step, &result, &events)?;
            } else {
                match &result {
                    Ok(detail) => writeln!(out, "[{n}] {step}: ok, {detail}")?,
                    Err(err) => writeln!(out, "[{n}] {step}: FAILED, {err}")?,
                }
                for event in &events {
                    writeln!(out, "      {}", self.describe(event))?;
                }
            }
        }
        if json {
            self.write_json_summary(out, report)?;
        } else {
            self.write_summary(out, report)?;
        }
        Ok(report)
    }

    fn apply(&mut self, step: &Step) -> Result<String, StepError> {
        match step {
            Step::Deposit { account, amount } => {
                let voter = self.address(account);
                let amount = TokenAmount::parse_units(amount)?;
                self.engine.deposit(voter, amount)?;
                let total = self.engine.voter(&voter).map(|r| r.deposited).unwrap_or_default();
                Ok(format!("deposit now {}", total.to_units_string()))
            }
            Step::Approve { account, amount } => {
                let holder = self.address(account);
                let amount = TokenAmount::parse_units(amount)?;
                let dao = self.engine.address();
                self.engine.ledger_mut().approve(&holder, &dao, amount);
                Ok(format!("allowance {}", amount.to_units_string()))
            }
            Step::AddProposal {
                caller,
                recipient,
                description,
                mint,
                payload,
            } => {
                let call_data = match (mint, payload) {
                    (Some(mint), None) => TokenCall::Mint {
                        to: self.address(&mint.to),
                        amount: TokenAmount::parse_units(&mint.amount)?,
                    }
                    .encode(),
                    (None, Some(hex_data)) => hex::decode(hex_data.trim_start_matches("0x"))
                        .map_err(|e| StepError::Payload(e.to_string()))?,
                    (None, None) => Vec::new(),
                    (Some(_), Some(_)) => {
                        return Err(StepError::Payload(
                            "give either `mint` or `payload`, not both".into(),
                        ))
                    }
                };
                let caller = self.address(caller);
                let recipient = self.address(recipient);
                let id = self
                    .engine
                    .add_proposal(caller, recipient, call_data, description.as_str())?;
                let deadline = self.engine.proposal(id).map(|p| p.deadline).unwrap_or_default();
                Ok(format!("proposal {id}, debate ends at {deadline}"))
            }
            Step::Vote {
                account,
                proposal,
                support,
            } => {
                let voter = self.address(account);
                let id = ProposalId::new(*proposal);
                self.engine.vote(voter, id, *support)?;
                let (for_votes, against) = self
                    .engine
                    .proposal(id)
                    .map(|p| (p.votes_for, p.votes_against))
                    .unwrap_or_default();
                Ok(format!(
                    "tally {} for / {} against",
                    for_votes.to_units_string(),
                    against.to_units_string()
                ))
            }
            Step::Finish { caller, proposal } => {
                let caller = self.address(caller);
                let outcome = self.engine.finish(caller, ProposalId::new(*proposal))?;
                if outcome.success() {
                    Ok("executed".to_string())
                } else {
                    Ok(format!("rejected: {}", outcome.reason()))
                }
            }
            Step::Withdraw { account } => {
                let voter = self.address(account);
                let amount = self.engine.withdraw(voter)?;
                Ok(format!("returned {}", amount.to_units_string()))
            }
            Step::UpdateDebatePeriod { caller, secs } => {
                let caller = self.address(caller);
                self.engine.update_debate_period(caller, *secs)?;
                Ok(format!("debating period {}", format_duration(*secs)))
            }
            Step::GrantRole {
                caller,
                account,
                role,
            } => {
                let role = match role.to_ascii_lowercase().as_str() {
                    "admin" | "admin_role" => Role::Admin,
                    "dao" | "dao_role" => Role::Dao,
                    _ => return Err(StepError::UnknownRole(role.clone())),
                };
                let admin = self.address(caller);
                let account = self.address(account);
                self.engine.ledger_mut().grant_role(&admin, role, &account)?;
                Ok(format!("{} granted", role.as_str()))
            }
            Step::Advance { secs } => {
                self.clock.advance(*secs);
                Ok(format!("now {}", self.clock.now()))
            }
        }
    }

    /// Resolve a label, remembering it for output.
    fn address(&mut self, label: &str) -> Address {
        let address = resolve(label);
        self.names
            .entry(address)
            .or_insert_with(|| label.to_string());
        address
    }

    fn name(&self, address: &Address) -> String {
        self.names
            .get(address)
            .cloned()
            .unwrap_or_else(|| address.to_string())
    }

    fn describe(&self, event: &GovernanceEvent) -> String {
        match event {
            GovernanceEvent::Deposited { voter, amount } => {
                format!("Deposited({}, {})", self.name(voter), amount.to_units_string())
            }
            GovernanceEvent::Withdrawn { voter, amount } => {
                format!("Withdrawn({}, {})", self.name(voter), amount.to_units_string())
            }
            GovernanceEvent::ProposalAdded {
                id,
                recipient,
                description,
            } => format!("ProposalAdded({id}, {}, {description:?})", self.name(recipient)),
            GovernanceEvent::Voted { id, voter, is_for } => {
                format!("Voted({id}, {}, {is_for})", self.name(voter))
            }
            GovernanceEvent::VotingFinished {
                id,
                success,
                reason,
            } => format!("VotingFinished({id}, {success}, {reason:?})"),
            GovernanceEvent::DebatingPeriodUpdated { old_secs, new_secs } => {
                format!("DebatingPeriodUpdated({old_secs}, {new_secs})")
            }
        }
    }

    fn write_json_step(
        &self,
        out: &mut impl Write,
        n: usize,
        step: &Step,
        result: &Result<String, StepError>,
        events: &[GovernanceEvent],
    ) -> Result<(), CliError> {
        let line = StepLine {
            step: n,
            action: step.action(),
            ok: result.is_ok(),
            detail: result.as_ref().ok().map(String::as_str),
            error: result.as_ref().err().map(ToString::to_string),
            events,
        };
        write_json_line(out, &line)
    }

    fn write_json_summary(&self, out: &mut impl Write, report: RunReport) -> Result<(), CliError> {
        let line = SummaryLine {
            summary: Summary {
                steps: report.steps,
                failed: report.failed,
                now: self.clock.now(),
                total_supply: self.engine.ledger().total_supply(),
                custody: self.engine.custody_balance(),
                proposals: self.engine.proposals().collect(),
            },
        };
        write_json_line(out, &line)
    }

    fn write_summary(&self, out: &mut impl Write, report: RunReport) -> Result<(), CliError> {
        writeln!(
            out,
            "{} steps, {} rejected; now {}",
            report.steps,
            report.failed,
            self.clock.now()
        )?;
        writeln!(
            out,
            "supply {} {}, custody {}",
            self.engine.ledger().total_supply().to_units_string(),
            self.engine.ledger().symbol(),
            self.engine.custody_balance().to_units_string()
        )?;
        for p in self.engine.proposals() {
            let status = match p.status {
                ProposalStatus::Active => "active",
                ProposalStatus::Finished => "finished",
            };
            writeln!(
                out,
                "proposal {} [{status}] {:?}: {} for / {} against",
                p.id,
                p.description,
                p.votes_for.to_units_string(),
                p.votes_against.to_units_string()
            )?;
        }
        let mut voters: Vec<_> = self
            .engine
            .voters()
            .map(|(address, record)| (self.name(address), *record))
            .collect();
        voters.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, record) in voters {
            writeln!(
                out,
                "voter {name}: deposit {}, locked until {}",
                record.deposited.to_units_string(),
                record.locked_until
            )?;
        }
        Ok(())
    }
}

fn write_json_line(out: &mut impl Write, value: &impl Serialize) -> Result<(), CliError> {
    serde_json::to_writer(&mut *out, value).map_err(|e| CliError::Io(e.into()))?;
    writeln!(out)?;
    Ok(())
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("engine", &self.engine)
            .field("now", &self.clock.now())
            .finish()
    }
}
