//! Governance configuration.

use crate::error::GovernanceError;
use dao_types::{Address, TokenAmount};
use serde::{Deserialize, Serialize};

/// Three days, the debating period used when none is configured.
pub const DEFAULT_DEBATING_PERIOD_SECS: u64 = 3 * 24 * 60 * 60;

/// Construction-time governance settings.
///
/// `chair` and `owner` are fixed for the engine's lifetime. The debating
/// period can later be changed by either of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// The only account allowed to submit proposals.
    pub chair: Address,
    /// The deploying account; may update the debating period alongside the chair.
    pub owner: Address,
    /// Minimum participation, as a percentage of total token supply, in `1..=100`.
    pub quorum_percentage: u8,
    /// Seconds between proposal creation and the earliest `finish`.
    pub debating_period_secs: u64,
}

impl GovernanceParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.quorum_percentage == 0 || self.quorum_percentage > 100 {
            return Err(GovernanceError::InvalidQuorum(self.quorum_percentage));
        }
        if self.debating_period_secs == 0 {
            return Err(GovernanceError::InvalidDebatingPeriod);
        }
        Ok(())
    }

    /// Smallest participating weight that satisfies quorum for `total_supply`:
    /// `ceil(quorum_percentage * total_supply / 100)`, computed without overflow.
    pub fn quorum_threshold(&self, total_supply: TokenAmount) -> TokenAmount {
        let supply = total_supply.raw();
        let q = u128::from(self.quorum_percentage);
        // q <= 100, so neither product below can overflow.
        let whole = supply / 100 * q;
        let rest = (supply % 100 * q).div_ceil(100);
        TokenAmount::new(whole + rest)
    }

    /// `100 * weight >= quorum_percentage * total_supply`.
    pub fn quorum_met(&self, weight: TokenAmount, total_supply: TokenAmount) -> bool {
        weight >= self.quorum_threshold(total_supply)
    }
}
