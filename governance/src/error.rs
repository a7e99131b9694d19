use dao_token::TokenError;
use dao_types::{ProposalId, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Not valid amount")]
    InvalidAmount,

    #[error("token transfer failed: {0}")]
    TransferFailed(#[source] TokenError),

    #[error("Voters should deposit some amount first")]
    NoDeposit,

    #[error("Voters with an active proposal cannot withdraw (locked until {until})")]
    ActiveVoteLock { until: Timestamp },

    #[error("Not enough permissions")]
    Unauthorized,

    #[error("Not valid address")]
    InvalidRecipient,

    #[error("Proposal is not active or not exist: {0}")]
    ProposalNotActive(ProposalId),

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Voting cannot be finished now (debating period ends at {deadline})")]
    DebatingPeriodNotOver { deadline: Timestamp },

    #[error("quorum percentage must be in 1..=100, got {0}")]
    InvalidQuorum(u8),

    #[error("debating period must be positive")]
    InvalidDebatingPeriod,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("governance state lock poisoned")]
    Poisoned,
}
