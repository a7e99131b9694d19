//! Proposals, vote receipts and the store that owns them.

use std::collections::{BTreeMap, HashMap};

use crate::error::GovernanceError;
use dao_token::Executable;
use dao_types::{Address, ProposalId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

/// Lifecycle of a proposal. `Finished` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Active,
    Finished,
}

/// Direction of a cast vote, stored as the voter's receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteChoice {
    For,
    Against,
}

impl VoteChoice {
    pub fn is_for(&self) -> bool {
        matches!(self, Self::For)
    }
}

impl From<bool> for VoteChoice {
    fn from(is_for: bool) -> Self {
        if is_for {
            Self::For
        } else {
            Self::Against
        }
    }
}

/// A chair-submitted proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    /// Contract the call is executed against on success.
    pub recipient: Address,
    /// Opaque payload handed to the recipient.
    pub call_data: Vec<u8>,
    pub description: String,
    pub votes_for: TokenAmount,
    pub votes_against: TokenAmount,
    pub created_at: Timestamp,
    /// `created_at` plus the debating period in force at creation.
    pub deadline: Timestamp,
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    /// Combined weight of every vote cast.
    pub fn total_weight(&self) -> Option<TokenAmount> {
        self.votes_for.checked_add(self.votes_against)
    }

    /// Whether voting has closed relative to `now`.
    pub fn debate_over(&self, now: Timestamp) -> bool {
        now >= self.deadline
    }

    pub fn executable(&self) -> Executable {
        Executable::new(self.recipient, self.call_data.clone())
    }
}

/// Arena of every proposal ever created plus per-voter receipts.
///
/// Ids are dense and assigned in creation order starting at
/// [`ProposalId::FIRST`].
#[derive(Debug)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    receipts: HashMap<(ProposalId, Address), VoteChoice>,
    next_id: ProposalId,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            proposals: BTreeMap::new(),
            receipts: HashMap::new(),
            next_id: ProposalId::FIRST,
        }
    }

    /// Store a new active proposal with empty tallies and return its id.
    pub fn create(
        &mut self,
        recipient: Address,
        call_data: Vec<u8>,
        description: String,
        created_at: Timestamp,
        debating_period_secs: u64,
    ) -> ProposalId {
        let id = self.next_id;
        self.next_id = id.next();
        self.proposals.insert(
            id,
            Proposal {
                id,
                recipient,
                call_data,
                description,
                votes_for: TokenAmount::ZERO,
                votes_against: TokenAmount::ZERO,
                created_at,
                deadline: created_at.saturating_add(debating_period_secs),
                status: ProposalStatus::Active,
            },
        );
        id
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    /// The proposal, provided it exists and is still active.
    pub fn active(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .filter(|p| p.is_active())
            .ok_or(GovernanceError::ProposalNotActive(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn receipt(&self, id: ProposalId, voter: &Address) -> Option<VoteChoice> {
        self.receipts.get(&(id, *voter)).copied()
    }

    /// Record `voter`'s receipt and add `weight` to the matching tally.
    ///
    /// Fails without effect if the proposal is not active, the voter already
    /// holds a receipt, or the tally would overflow.
    pub fn record_vote(
        &mut self,
        id: ProposalId,
        voter: Address,
        choice: VoteChoice,
        weight: TokenAmount,
    ) -> Result<&Proposal, GovernanceError> {
        self.active(id)?;
        if self.receipts.contains_key(&(id, voter)) {
            return Err(GovernanceError::AlreadyVoted);
        }
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotActive(id))?;
        let tally = match choice {
            VoteChoice::For => &mut proposal.votes_for,
            VoteChoice::Against => &mut proposal.votes_against,
        };
        *tally = tally.checked_add(weight).ok_or(GovernanceError::Overflow)?;
        self.receipts.insert((id, voter), choice);
        Ok(&*proposal)
    }

    /// Move an active proposal to `Finished`.
    pub fn mark_finished(&mut self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .filter(|p| p.is_active())
            .ok_or(GovernanceError::ProposalNotActive(id))?;
        proposal.status = ProposalStatus::Finished;
        Ok(&*proposal)
    }
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}
