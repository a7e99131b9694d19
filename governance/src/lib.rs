//! Stake-weighted governance.
//!
//! Depositors lock voting tokens into a shared pool, a designated chair submits
//! proposals, and depositors vote with weight equal to their deposit at the time
//! of voting. Once a proposal's debating period has elapsed anyone may finish it:
//! quorum is checked against total token supply, then simple majority (ties
//! reject), then the proposal's call is executed through the token ledger.
//!
//! A voter cannot withdraw while any proposal they voted on is still in its
//! debating period.

pub mod deposits;
pub mod engine;
pub mod error;
pub mod event;
pub mod handle;
pub mod outcome;
pub mod params;
pub mod proposal;

pub use deposits::{DepositLedger, VoterRecord};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use event::{EventBus, EventRecorder, GovernanceEvent};
pub use handle::GovernanceHandle;
pub use outcome::{FinishOutcome, Resolution};
pub use params::GovernanceParams;
pub use proposal::{Proposal, ProposalStatus, ProposalStore, VoteChoice};
