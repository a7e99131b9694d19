//! Thread-safe access to a single engine.
//!
//! Each call takes the engine lock for its whole duration, so operations from
//! different threads are serialized and never observe each other half-applied.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::outcome::FinishOutcome;
use dao_token::TokenLedger;
use dao_types::{Address, ProposalId, TokenAmount};

/// Cloneable, shareable handle to a [`GovernanceEngine`].
pub struct GovernanceHandle<L> {
    inner: Arc<Mutex<GovernanceEngine<L>>>,
}

impl<L> Clone for GovernanceHandle<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: TokenLedger> GovernanceHandle<L> {
    pub fn new(engine: GovernanceEngine<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, GovernanceEngine<L>>, GovernanceError> {
        self.inner.lock().map_err(|_| GovernanceError::Poisoned)
    }

    pub fn deposit(&self, voter: Address, amount: TokenAmount) -> Result<(), GovernanceError> {
        self.lock()?.deposit(voter, amount)
    }

    pub fn withdraw(&self, voter: Address) -> Result<TokenAmount, GovernanceError> {
        self.lock()?.withdraw(voter)
    }

    pub fn add_proposal(
        &self,
        caller: Address,
        recipient: Address,
        call_data: Vec<u8>,
        description: impl Into<String>,
    ) -> Result<ProposalId, GovernanceError> {
        self.lock()?
            .add_proposal(caller, recipient, call_data, description)
    }

    pub fn vote(&self, voter: Address, id: ProposalId, is_for: bool) -> Result<(), GovernanceError> {
        self.lock()?.vote(voter, id, is_for)
    }

    pub fn finish(&self, caller: Address, id: ProposalId) -> Result<FinishOutcome, GovernanceError> {
        self.lock()?.finish(caller, id)
    }

    pub fn update_debate_period(&self, caller: Address, new_secs: u64) -> Result<(), GovernanceError> {
        self.lock()?.update_debate_period(caller, new_secs)
    }

    /// Run `f` against a consistent snapshot of the engine.
    pub fn read<R>(&self, f: impl FnOnce(&GovernanceEngine<L>) -> R) -> Result<R, GovernanceError> {
        Ok(f(&*self.lock()?))
    }

    /// Run `f` with exclusive access, e.g. for ledger setup outside governance.
    pub fn with_mut<R>(
        &self,
        f: impl FnOnce(&mut GovernanceEngine<L>) -> R,
    ) -> Result<R, GovernanceError> {
        Ok(f(&mut *self.lock()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GovernanceParams;
    use dao_nullables::NullClock;
    use dao_token::Token;
    use std::thread;

    fn addr(label: &str) -> Address {
        Address::derive(label)
    }

    #[test]
    fn concurrent_votes_are_all_counted_once() {
        let voters: Vec<Address> = (0..8).map(|i| addr(&format!("voter{i}"))).collect();
        let mut token = Token::new(
            addr("token"),
            "Voting Token",
            "VTT",
            TokenAmount::new(800),
            addr("owner"),
        );
        for v in &voters {
            token
                .transfer(&addr("owner"), v, TokenAmount::new(100))
                .unwrap();
            token.approve(v, &addr("dao"), TokenAmount::new(100));
        }
        let params = GovernanceParams {
            chair: addr("chair"),
            owner: addr("owner"),
            quorum_percentage: 50,
            debating_period_secs: 60,
        };
        let engine =
            GovernanceEngine::new(addr("dao"), params, token, std::sync::Arc::new(NullClock::new(0)))
                .unwrap();
        let handle = GovernanceHandle::new(engine);
        let id = handle
            .add_proposal(addr("chair"), addr("token"), vec![], "noop")
            .unwrap();

        let workers: Vec<_> = voters
            .iter()
            .copied()
            .enumerate()
            .map(|(i, voter)| {
                let handle = handle.clone();
                thread::spawn(move || {
                    handle.deposit(voter, TokenAmount::new(100)).unwrap();
                    handle.vote(voter, id, i % 2 == 0).unwrap();
                    // A duplicate from the same voter must always lose.
                    handle.vote(voter, id, i % 2 == 0).unwrap_err()
                })
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), GovernanceError::AlreadyVoted);
        }

        let (for_votes, against, deposited, custody) = handle
            .read(|e| {
                let p = e.proposal(id).unwrap();
                (p.votes_for, p.votes_against, e.total_deposited(), e.custody_balance())
            })
            .unwrap();
        assert_eq!(for_votes, TokenAmount::new(400));
        assert_eq!(against, TokenAmount::new(400));
        assert_eq!(deposited, custody);
    }
}
