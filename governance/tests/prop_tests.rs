use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use dao_governance::{GovernanceEngine, GovernanceError, GovernanceParams};
use dao_nullables::NullClock;
use dao_token::{Token, TokenLedger};
use dao_types::{Address, ProposalId, TokenAmount};

const PERIOD: u64 = 1_000;
const VOTERS: usize = 4;

#[derive(Clone, Debug)]
enum Op {
    Deposit { voter: usize, amount: u128 },
    Withdraw { voter: usize },
    Propose,
    Vote { voter: usize, proposal: u64, is_for: bool },
    Finish { proposal: u64 },
    Advance { secs: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..VOTERS, 0u128..40).prop_map(|(voter, amount)| Op::Deposit { voter, amount }),
        (0..VOTERS).prop_map(|voter| Op::Withdraw { voter }),
        Just(Op::Propose),
        (0..VOTERS, 1u64..5, any::<bool>())
            .prop_map(|(voter, proposal, is_for)| Op::Vote { voter, proposal, is_for }),
        (1u64..5).prop_map(|proposal| Op::Finish { proposal }),
        (0u64..800).prop_map(|secs| Op::Advance { secs }),
    ]
}

fn voter(i: usize) -> Address {
    Address::derive(&format!("voter{i}"))
}

fn setup() -> (GovernanceEngine<Token>, Arc<NullClock>) {
    let owner = Address::derive("owner");
    let dao = Address::derive("dao");
    let mut token = Token::new(
        Address::derive("token"),
        "Voting Token",
        "VTT",
        TokenAmount::new(400),
        owner,
    );
    for i in 0..VOTERS {
        token.transfer(&owner, &voter(i), TokenAmount::new(100)).unwrap();
        token.approve(&voter(i), &dao, TokenAmount::new(u128::MAX));
    }
    let clock = Arc::new(NullClock::new(0));
    let params = GovernanceParams {
        chair: Address::derive("chair"),
        owner,
        quorum_percentage: 30,
        debating_period_secs: PERIOD,
    };
    let engine = GovernanceEngine::new(dao, params, token, clock.clone()).unwrap();
    (engine, clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Custody, tallies, locks and receipts stay consistent under any
    /// sequence of operations. Withdraw succeeds exactly when the voter has a
    /// deposit and no running lock, and votes land only before the deadline.
    #[test]
    fn engine_invariants_hold(ops in prop::collection::vec(op(), 1..60)) {
        let (mut engine, clock) = setup();
        let chair = Address::derive("chair");
        // (proposal, voter) → weight cast.
        let mut cast: HashMap<(u64, usize), u128> = HashMap::new();

        for op in ops {
            match op {
                Op::Deposit { voter: v, amount } => {
                    let before = engine.voter(&voter(v)).map(|r| r.deposited).unwrap_or_default();
                    let result = engine.deposit(voter(v), TokenAmount::new(amount));
                    if amount == 0 {
                        prop_assert_eq!(result, Err(GovernanceError::InvalidAmount));
                    } else if result.is_ok() {
                        let after = engine.voter(&voter(v)).unwrap().deposited;
                        prop_assert_eq!(after.raw(), before.raw() + amount);
                    } else {
                        prop_assert!(matches!(result, Err(GovernanceError::TransferFailed(_))));
                    }
                }
                Op::Withdraw { voter: v } => {
                    let record = engine.voter(&voter(v)).copied().unwrap_or_default();
                    let expect_ok = !record.deposited.is_zero() && clock.now() >= record.locked_until;
                    let result = engine.withdraw(voter(v));
                    prop_assert_eq!(result.is_ok(), expect_ok);
                    if expect_ok {
                        prop_assert_eq!(engine.voter(&voter(v)).unwrap().deposited, TokenAmount::ZERO);
                    }
                }
                Op::Propose => {
                    let expected = ProposalId::new(engine.proposals().count() as u64 + 1);
                    let id = engine
                        .add_proposal(chair, Address::derive("token"), vec![], "noop")
                        .unwrap();
                    prop_assert_eq!(id, expected);
                }
                Op::Vote { voter: v, proposal, is_for } => {
                    let weight = engine.voter(&voter(v)).map(|r| r.deposited).unwrap_or_default();
                    let id = ProposalId::new(proposal);
                    let had_receipt = engine.receipt(id, &voter(v)).is_some();
                    let open = engine
                        .proposal(id)
                        .is_some_and(|p| p.is_active() && !p.debate_over(clock.now()));
                    let result = engine.vote(voter(v), id, is_for);
                    if result.is_ok() {
                        prop_assert!(open);
                        prop_assert!(!had_receipt);
                        cast.insert((proposal, v), weight.raw());
                        let deadline = engine.proposal(id).unwrap().deadline;
                        prop_assert!(engine.voter(&voter(v)).unwrap().locked_until >= deadline);
                    } else if weight.is_zero() {
                        prop_assert_eq!(result, Err(GovernanceError::NoDeposit));
                    } else if !open {
                        prop_assert_eq!(result, Err(GovernanceError::ProposalNotActive(id)));
                    } else if had_receipt {
                        prop_assert_eq!(result, Err(GovernanceError::AlreadyVoted));
                    }
                }
                Op::Finish { proposal } => {
                    let id = ProposalId::new(proposal);
                    let was_active = engine.proposal(id).is_some_and(|p| p.is_active());
                    let result = engine.finish(chair, id);
                    if result.is_ok() {
                        prop_assert!(was_active);
                        prop_assert!(!engine.proposal(id).unwrap().is_active());
                        prop_assert_eq!(
                            engine.finish(chair, id).unwrap_err(),
                            GovernanceError::ProposalNotActive(id)
                        );
                    }
                }
                Op::Advance { secs } => clock.advance(secs),
            }

            prop_assert_eq!(engine.total_deposited(), engine.custody_balance());
            for p in engine.proposals() {
                let expected: u128 = cast
                    .iter()
                    .filter(|((pid, _), _)| *pid == p.id.get())
                    .map(|(_, w)| *w)
                    .sum();
                prop_assert_eq!(p.votes_for.raw() + p.votes_against.raw(), expected);
            }
            prop_assert_eq!(engine.ledger().total_supply(), TokenAmount::new(400));
        }
    }

    /// Resolution follows quorum first, then strict majority.
    #[test]
    fn resolution_matches_quorum_and_majority(for_weight in 0u128..100, against_weight in 0u128..100) {
        let (mut engine, clock) = setup();
        let chair = Address::derive("chair");
        let id = engine.add_proposal(chair, Address::derive("token"), vec![], "noop").unwrap();
        if for_weight > 0 {
            engine.deposit(voter(0), TokenAmount::new(for_weight)).unwrap();
            engine.vote(voter(0), id, true).unwrap();
        }
        if against_weight > 0 {
            engine.deposit(voter(1), TokenAmount::new(against_weight)).unwrap();
            engine.vote(voter(1), id, false).unwrap();
        }
        clock.advance(PERIOD);

        let outcome = engine.finish(chair, id).unwrap();
        let quorum = 100 * (for_weight + against_weight) >= 30 * 400;
        let expected = if !quorum {
            "Not enough votes"
        } else if for_weight <= against_weight {
            "The majority voted against"
        } else {
            // Empty payload never decodes as a token call.
            "Proposal execution error"
        };
        prop_assert_eq!(outcome.reason(), expected);
        prop_assert!(!outcome.success());
    }
}
