//! Failure containment against a scriptable ledger.

use std::sync::Arc;

use dao_governance::{
    EventRecorder, GovernanceEngine, GovernanceError, GovernanceEvent, GovernanceParams,
    Resolution,
};
use dao_nullables::{NullClock, NullLedger};
use dao_token::{Executable, TokenError};
use dao_types::{Address, ProposalId, TokenAmount};

const PERIOD: u64 = 600;

fn addr(label: &str) -> Address {
    Address::derive(label)
}

struct Harness {
    engine: GovernanceEngine<NullLedger>,
    clock: Arc<NullClock>,
    events: EventRecorder,
}

fn harness() -> Harness {
    let mut ledger = NullLedger::new(addr("token"));
    ledger.fund(addr("alice"), TokenAmount::new(60));
    ledger.fund(addr("bob"), TokenAmount::new(40));
    let clock = Arc::new(NullClock::new(50));
    let params = GovernanceParams {
        chair: addr("chair"),
        owner: addr("owner"),
        quorum_percentage: 50,
        debating_period_secs: PERIOD,
    };
    let mut engine = GovernanceEngine::new(addr("dao"), params, ledger, clock.clone()).unwrap();
    let events = EventRecorder::new();
    engine.subscribe(events.listener());
    Harness {
        engine,
        clock,
        events,
    }
}

fn passing_proposal(h: &mut Harness) -> ProposalId {
    let id = h
        .engine
        .add_proposal(addr("chair"), addr("token"), vec![1, 2, 3], "opaque call")
        .unwrap();
    h.engine.deposit(addr("alice"), TokenAmount::new(60)).unwrap();
    h.engine.vote(addr("alice"), id, true).unwrap();
    h.clock.advance(PERIOD);
    id
}

#[test]
fn failed_deposit_transfer_changes_nothing() {
    let mut h = harness();
    h.engine.ledger_mut().fail_transfers(true);

    let err = h
        .engine
        .deposit(addr("alice"), TokenAmount::new(10))
        .unwrap_err();

    assert!(matches!(
        err,
        GovernanceError::TransferFailed(TokenError::InsufficientBalance { .. })
    ));
    assert!(h.engine.voter(&addr("alice")).is_none());
    assert_eq!(h.engine.custody_balance(), TokenAmount::ZERO);
    assert!(h.events.events().is_empty());
}

#[test]
fn failed_withdraw_transfer_keeps_deposit() {
    let mut h = harness();
    h.engine.deposit(addr("bob"), TokenAmount::new(40)).unwrap();
    h.events.take();
    h.engine.ledger_mut().fail_transfers(true);

    let err = h.engine.withdraw(addr("bob")).unwrap_err();

    assert!(matches!(err, GovernanceError::TransferFailed(_)));
    assert_eq!(
        h.engine.voter(&addr("bob")).unwrap().deposited,
        TokenAmount::new(40)
    );
    assert_eq!(h.engine.total_deposited(), h.engine.custody_balance());
    assert!(h.events.events().is_empty());

    h.engine.ledger_mut().fail_transfers(false);
    assert_eq!(h.engine.withdraw(addr("bob")).unwrap(), TokenAmount::new(40));
}

#[test]
fn execution_is_made_by_the_custody_account() {
    let mut h = harness();
    let id = passing_proposal(&mut h);

    let outcome = h.engine.finish(addr("bob"), id).unwrap();

    assert_eq!(outcome.resolution, Resolution::Executed);
    assert_eq!(
        h.engine.ledger().executed(),
        &[(addr("dao"), Executable::new(addr("token"), vec![1, 2, 3]))]
    );
    assert_eq!(
        h.events.last(),
        Some(GovernanceEvent::VotingFinished {
            id,
            success: true,
            reason: String::new(),
        })
    );
}

#[test]
fn execution_failure_is_contained() {
    let mut h = harness();
    let id = passing_proposal(&mut h);
    h.engine.ledger_mut().fail_execution(true);

    let outcome = h.engine.finish(addr("chair"), id).unwrap();

    assert!(matches!(outcome.resolution, Resolution::ExecutionFailed(_)));
    assert_eq!(outcome.reason(), "Proposal execution error");
    assert!(!h.engine.proposal(id).unwrap().is_active());
    assert!(h.engine.ledger().executed().is_empty());
    assert_eq!(
        h.engine.finish(addr("chair"), id).unwrap_err(),
        GovernanceError::ProposalNotActive(id)
    );
}

#[test]
fn quorum_uses_supply_at_finish_time() {
    let mut h = harness();
    let id = passing_proposal(&mut h);
    // 60 of 100 passes a 50% quorum; 60 of 200 does not.
    h.engine
        .ledger_mut()
        .set_total_supply(TokenAmount::new(200));

    let outcome = h.engine.finish(addr("chair"), id).unwrap();

    assert_eq!(outcome.resolution, Resolution::NotEnoughVotes);
    assert!(h.engine.ledger().executed().is_empty());
}

#[test]
fn quorum_boundary_is_inclusive() {
    let mut h = harness();
    let id = h
        .engine
        .add_proposal(addr("chair"), addr("token"), vec![], "boundary")
        .unwrap();
    h.engine.deposit(addr("alice"), TokenAmount::new(30)).unwrap();
    h.engine.deposit(addr("bob"), TokenAmount::new(20)).unwrap();
    h.engine.vote(addr("alice"), id, true).unwrap();
    h.engine.vote(addr("bob"), id, false).unwrap();
    h.clock.advance(PERIOD);

    // 50 of 100 at 50% quorum: exactly met.
    let outcome = h.engine.finish(addr("chair"), id).unwrap();
    assert_eq!(outcome.resolution, Resolution::Executed);
}

#[test]
fn zero_supply_meets_quorum_trivially() {
    let mut h = harness();
    let id = passing_proposal(&mut h);
    h.engine.ledger_mut().set_total_supply(TokenAmount::ZERO);

    let outcome = h.engine.finish(addr("chair"), id).unwrap();

    assert!(outcome.success());
}
