//! Results of finishing a proposal.

use dao_token::TokenError;
use dao_types::ProposalId;

pub const REASON_NOT_ENOUGH_VOTES: &str = "Not enough votes";
pub const REASON_MAJORITY_AGAINST: &str = "The majority voted against";
pub const REASON_EXECUTION_ERROR: &str = "Proposal execution error";

/// How a finished proposal was resolved, in evaluation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// `100 * (for + against) < quorum% * total supply`.
    NotEnoughVotes,
    /// `for <= against`; ties reject.
    MajorityAgainst,
    /// Both checks passed but the ledger refused the call. The proposal stays
    /// finished; only the call's effect is missing.
    ExecutionFailed(TokenError),
    /// The call ran.
    Executed,
}

impl Resolution {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Executed)
    }

    /// Reason string carried by the `VotingFinished` event; empty on success.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotEnoughVotes => REASON_NOT_ENOUGH_VOTES,
            Self::MajorityAgainst => REASON_MAJORITY_AGAINST,
            Self::ExecutionFailed(_) => REASON_EXECUTION_ERROR,
            Self::Executed => "",
        }
    }
}

/// Returned by [`GovernanceEngine::finish`](crate::GovernanceEngine::finish).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishOutcome {
    pub proposal_id: ProposalId,
    pub resolution: Resolution,
}

impl FinishOutcome {
    pub fn success(&self) -> bool {
        self.resolution.is_success()
    }

    pub fn reason(&self) -> &'static str {
        self.resolution.reason()
    }
}
