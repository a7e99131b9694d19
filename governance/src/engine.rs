//! Core governance engine: deposits, proposals, voting and resolution.
//!
//! Every operation validates first, then calls the token ledger, then mutates
//! local state, then emits its event. A rejected operation therefore leaves no
//! trace. The one contained failure is proposal execution inside
//! [`GovernanceEngine::finish`], which is reported in the outcome instead of
//! unwinding the `Finished` transition.

use std::sync::Arc;

use crate::deposits::{DepositLedger, VoterRecord};
use crate::error::GovernanceError;
use crate::event::{EventBus, GovernanceEvent};
use crate::outcome::{FinishOutcome, Resolution};
use crate::params::GovernanceParams;
use crate::proposal::{Proposal, ProposalStore, VoteChoice};
use dao_token::TokenLedger;
use dao_types::{Address, Clock, ProposalId, TokenAmount};

pub struct GovernanceEngine<L> {
    params: GovernanceParams,
    /// Custody account: receives deposits and makes calls on the ledger.
    address: Address,
    ledger: L,
    clock: Arc<dyn Clock>,
    deposits: DepositLedger,
    proposals: ProposalStore,
    events: EventBus,
}

impl<L: TokenLedger> GovernanceEngine<L> {
    /// Create an engine that holds custody at `address`.
    pub fn new(
        address: Address,
        params: GovernanceParams,
        ledger: L,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        tracing::info!(
            %address,
            chair = %params.chair,
            token = %ledger.address(),
            quorum_percentage = params.quorum_percentage,
            debating_period_secs = params.debating_period_secs,
            "governance engine created"
        );
        Ok(Self {
            params,
            address,
            ledger,
            clock,
            deposits: DepositLedger::new(),
            proposals: ProposalStore::new(),
            events: EventBus::new(),
        })
    }

    // ── Operations ──────────────────────────────────────────────────────

    /// Pull `amount` from `voter` into custody and credit their deposit.
    ///
    /// The voter must have approved the engine's address on the ledger.
    pub fn deposit(&mut self, voter: Address, amount: TokenAmount) -> Result<(), GovernanceError> {
        if amount.is_zero() {
            return Err(GovernanceError::InvalidAmount);
        }
        self.deposits.balance_after_credit(&voter, amount)?;
        self.ledger
            .transfer_from(&self.address, &voter, &self.address, amount)
            .map_err(GovernanceError::TransferFailed)?;
        let total = self.deposits.credit(voter, amount)?;
        tracing::info!(%voter, amount = amount.raw(), total = total.raw(), "deposited");
        self.events
            .emit(&GovernanceEvent::Deposited { voter, amount });
        Ok(())
    }

    /// Return `voter`'s whole deposit. Refused while any proposal they voted
    /// on is still being debated, whether or not it has been finished.
    pub fn withdraw(&mut self, voter: Address) -> Result<TokenAmount, GovernanceError> {
        let record = self.deposits.get(&voter).copied().unwrap_or_default();
        if record.deposited.is_zero() {
            return Err(GovernanceError::NoDeposit);
        }
        if record.is_locked(self.clock.now()) {
            return Err(GovernanceError::ActiveVoteLock {
                until: record.locked_until,
            });
        }
        self.ledger
            .transfer(&self.address, &voter, record.deposited)
            .map_err(GovernanceError::TransferFailed)?;
        let amount = self.deposits.release(&voter);
        tracing::info!(%voter, amount = amount.raw(), "withdrawn");
        self.events
            .emit(&GovernanceEvent::Withdrawn { voter, amount });
        Ok(amount)
    }

    /// Submit a proposal. Only the chair may call this.
    pub fn add_proposal(
        &mut self,
        caller: Address,
        recipient: Address,
        call_data: Vec<u8>,
        description: impl Into<String>,
    ) -> Result<ProposalId, GovernanceError> {
        if caller != self.params.chair {
            return Err(GovernanceError::Unauthorized);
        }
        if recipient.is_zero() {
            return Err(GovernanceError::InvalidRecipient);
        }
        let description = description.into();
        let id = self.proposals.create(
            recipient,
            call_data,
            description.clone(),
            self.clock.now(),
            self.params.debating_period_secs,
        );
        tracing::info!(%id, %recipient, %description, "proposal added");
        self.events.emit(&GovernanceEvent::ProposalAdded {
            id,
            recipient,
            description,
        });
        Ok(id)
    }

    /// Cast `voter`'s whole current deposit for or against a proposal and
    /// lock their deposit until the proposal's deadline.
    ///
    /// Voting closes at the deadline even if nobody has finished the proposal
    /// yet; a vote then would carry a lock that has already expired. Later
    /// deposits do not change the weight already cast.
    pub fn vote(
        &mut self,
        voter: Address,
        id: ProposalId,
        is_for: bool,
    ) -> Result<(), GovernanceError> {
        let weight = self.deposits.deposited(&voter);
        if weight.is_zero() {
            return Err(GovernanceError::NoDeposit);
        }
        if self.proposals.active(id)?.debate_over(self.clock.now()) {
            return Err(GovernanceError::ProposalNotActive(id));
        }
        let proposal = self
            .proposals
            .record_vote(id, voter, VoteChoice::from(is_for), weight)?;
        let deadline = proposal.deadline;
        self.deposits.extend_lock(voter, deadline);
        tracing::info!(%id, %voter, is_for, weight = weight.raw(), "voted");
        self.events
            .emit(&GovernanceEvent::Voted { id, voter, is_for });
        Ok(())
    }

    /// Close a proposal whose debating period has elapsed and resolve it.
    ///
    /// Any account may call this. Once the proposal is found active and past
    /// its deadline the call always returns `Ok`, even if executing the
    /// proposal's call fails.
    pub fn finish(
        &mut self,
        caller: Address,
        id: ProposalId,
    ) -> Result<FinishOutcome, GovernanceError> {
        let now = self.clock.now();
        let proposal = self.proposals.active(id)?;
        if !proposal.debate_over(now) {
            return Err(GovernanceError::DebatingPeriodNotOver {
                deadline: proposal.deadline,
            });
        }
        let proposal = self.proposals.mark_finished(id)?.clone();

        let resolution = self.resolve(&proposal);
        match &resolution {
            Resolution::ExecutionFailed(err) => {
                tracing::warn!(%id, %caller, error = %err, "proposal execution failed");
            }
            other => {
                tracing::info!(
                    %id,
                    %caller,
                    success = other.is_success(),
                    reason = other.reason(),
                    "voting finished"
                );
            }
        }
        self.events.emit(&GovernanceEvent::VotingFinished {
            id,
            success: resolution.is_success(),
            reason: resolution.reason().to_string(),
        });
        Ok(FinishOutcome {
            proposal_id: id,
            resolution,
        })
    }

    /// Quorum, then majority, then execution.
    fn resolve(&mut self, proposal: &Proposal) -> Resolution {
        // Tallies are checked on every vote, so the sum always fits.
        let weight = proposal.total_weight().unwrap_or(TokenAmount::new(u128::MAX));
        let supply = self.ledger.total_supply();
        if !self.params.quorum_met(weight, supply) {
            return Resolution::NotEnoughVotes;
        }
        if proposal.votes_for <= proposal.votes_against {
            return Resolution::MajorityAgainst;
        }
        match self.ledger.execute(&self.address, &proposal.executable()) {
            Ok(()) => Resolution::Executed,
            Err(err) => Resolution::ExecutionFailed(err),
        }
    }

    /// Change the debating period for proposals created from now on.
    /// Restricted to the chair and the owner.
    pub fn update_debate_period(
        &mut self,
        caller: Address,
        new_secs: u64,
    ) -> Result<(), GovernanceError> {
        if caller != self.params.chair && caller != self.params.owner {
            return Err(GovernanceError::Unauthorized);
        }
        if new_secs == 0 {
            return Err(GovernanceError::InvalidDebatingPeriod);
        }
        let old_secs = std::mem::replace(&mut self.params.debating_period_secs, new_secs);
        tracing::info!(%caller, old_secs, new_secs, "debating period updated");
        self.events
            .emit(&GovernanceEvent::DebatingPeriodUpdated { old_secs, new_secs });
        Ok(())
    }

    // ── Observers ───────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn chair(&self) -> Address {
        self.params.chair
    }

    pub fn owner(&self) -> Address {
        self.params.owner
    }

    /// Address of the voting token's ledger.
    pub fn voting_token(&self) -> Address {
        self.ledger.address()
    }

    pub fn quorum_percentage(&self) -> u8 {
        self.params.quorum_percentage
    }

    pub fn debate_period(&self) -> u64 {
        self.params.debating_period_secs
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    pub fn voter(&self, voter: &Address) -> Option<&VoterRecord> {
        self.deposits.get(voter)
    }

    pub fn voters(&self) -> impl Iterator<Item = (&Address, &VoterRecord)> {
        self.deposits.iter()
    }

    pub fn receipt(&self, id: ProposalId, voter: &Address) -> Option<VoteChoice> {
        self.proposals.receipt(id, voter)
    }

    /// Sum of every voter's deposit.
    pub fn total_deposited(&self) -> TokenAmount {
        self.deposits.total()
    }

    /// Balance the ledger holds for the custody account.
    pub fn custody_balance(&self) -> TokenAmount {
        self.ledger.balance_of(&self.address)
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Direct ledger access, e.g. for approvals and role grants that happen
    /// outside governance.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }
}

impl<L> std::fmt::Debug for GovernanceEngine<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernanceEngine")
            .field("address", &self.address)
            .field("params", &self.params)
            .field("proposals", &self.proposals.len())
            .finish()
    }
}
