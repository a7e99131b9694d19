//! Per-voter deposit bookkeeping.

use std::collections::HashMap;

use crate::error::GovernanceError;
use dao_types::{Address, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

/// What a single voter has placed in custody.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub deposited: TokenAmount,
    /// Latest deadline among proposals this voter has voted on.
    /// Withdrawal is refused while `now < locked_until`.
    pub locked_until: Timestamp,
}

impl VoterRecord {
    pub fn is_locked(&self, now: Timestamp) -> bool {
        now < self.locked_until
    }
}

/// Deposits keyed by voter. Records are never removed; a zero balance is a
/// valid state and the voter may deposit again.
#[derive(Debug, Default)]
pub struct DepositLedger {
    voters: HashMap<Address, VoterRecord>,
}

impl DepositLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, voter: &Address) -> Option<&VoterRecord> {
        self.voters.get(voter)
    }

    /// Current deposit, zero for unknown voters.
    pub fn deposited(&self, voter: &Address) -> TokenAmount {
        self.voters
            .get(voter)
            .map(|r| r.deposited)
            .unwrap_or(TokenAmount::ZERO)
    }

    /// The balance `voter` would hold after depositing `amount`.
    pub fn balance_after_credit(
        &self,
        voter: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, GovernanceError> {
        self.deposited(voter)
            .checked_add(amount)
            .ok_or(GovernanceError::Overflow)
    }

    /// Add `amount` to `voter`'s deposit, creating the record on first use.
    pub fn credit(
        &mut self,
        voter: Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, GovernanceError> {
        let updated = self.balance_after_credit(&voter, amount)?;
        self.voters.entry(voter).or_default().deposited = updated;
        Ok(updated)
    }

    /// Raise `voter`'s lock to `until` if it is later than the current lock.
    pub fn extend_lock(&mut self, voter: Address, until: Timestamp) {
        let record = self.voters.entry(voter).or_default();
        record.locked_until = record.locked_until.max(until);
    }

    /// Zero `voter`'s deposit and return what it held.
    pub fn release(&mut self, voter: &Address) -> TokenAmount {
        match self.voters.get_mut(voter) {
            Some(record) => std::mem::replace(&mut record.deposited, TokenAmount::ZERO),
            None => TokenAmount::ZERO,
        }
    }

    /// Sum of all deposits; equals the custody balance held for voters.
    pub fn total(&self) -> TokenAmount {
        self.voters
            .values()
            .fold(TokenAmount::ZERO, |acc, r| {
                TokenAmount::new(acc.raw().saturating_add(r.deposited.raw()))
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &VoterRecord)> {
        self.voters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_accumulates_and_release_zeroes() {
        let mut ledger = DepositLedger::new();
        let voter = Address::derive("voter");
        ledger.credit(voter, TokenAmount::new(10)).unwrap();
        ledger.credit(voter, TokenAmount::new(15)).unwrap();
        assert_eq!(ledger.deposited(&voter), TokenAmount::new(25));
        assert_eq!(ledger.total(), TokenAmount::new(25));

        assert_eq!(ledger.release(&voter), TokenAmount::new(25));
        assert_eq!(ledger.deposited(&voter), TokenAmount::ZERO);
        assert!(ledger.get(&voter).is_some());
    }

    #[test]
    fn lock_only_moves_forward() {
        let mut ledger = DepositLedger::new();
        let voter = Address::derive("voter");
        ledger.extend_lock(voter, Timestamp::new(500));
        ledger.extend_lock(voter, Timestamp::new(300));
        let record = ledger.get(&voter).unwrap();
        assert_eq!(record.locked_until, Timestamp::new(500));
        assert!(record.is_locked(Timestamp::new(499)));
        assert!(!record.is_locked(Timestamp::new(500)));
    }

    #[test]
    fn credit_overflow_is_rejected() {
        let mut ledger = DepositLedger::new();
        let voter = Address::derive("voter");
        ledger.credit(voter, TokenAmount::new(u128::MAX)).unwrap();
        assert_eq!(
            ledger.credit(voter, TokenAmount::new(1)),
            Err(GovernanceError::Overflow)
        );
        assert_eq!(ledger.deposited(&voter), TokenAmount::new(u128::MAX));
    }

    #[test]
    fn release_of_unknown_voter_is_zero() {
        let mut ledger = DepositLedger::new();
        assert_eq!(ledger.release(&Address::derive("nobody")), TokenAmount::ZERO);
    }
}
