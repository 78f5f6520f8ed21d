//! Stress test: capacity ceiling and partial transfer under griefing.
//!
//! An adversary can only push authority tokens at a successor through
//! succession itself. These tests fill successors to the ceiling and check
//! that execution stays bounded, moves the original token first, and can be
//! resumed after the successor frees capacity.

use agentic_succession::registry::WaitPeriod;
use agentic_succession::time::days;
use agentic_succession::{
    Address, Call, CallOutcome, Chain, Event, Signer, SuccessionError, SuccessionReport, TokenId,
    MAX_INHERITED_TOKENS,
};

struct World {
    chain: Chain,
    factory: Address,
}

fn account(name: &str) -> Address {
    Signer::from_seed(name).address()
}

fn world() -> World {
    let gov = account("governance");
    let mut chain = Chain::with_time(gov, 0);
    let factory = match chain.execute(gov, Call::CreateFactory).unwrap() {
        CallOutcome::Deployed(address) => address,
        other => panic!("expected a deployment, got {other:?}"),
    };
    chain
        .execute(
            gov,
            Call::SetTrustedFactory {
                factory,
                trusted: true,
            },
        )
        .unwrap();
    World { chain, factory }
}

fn estate(w: &mut World, holder: Address, successor: Address) -> Address {
    w.chain.execute(holder, Call::Mint).unwrap();
    let registry = match w
        .chain
        .execute(holder, Call::DeployRegistry { factory: w.factory })
        .unwrap()
    {
        CallOutcome::Deployed(address) => address,
        other => panic!("expected a deployment, got {other:?}"),
    };
    w.chain
        .execute(
            holder,
            Call::Configure {
                registry,
                successor,
                wait_period: WaitPeriod::Short,
            },
        )
        .unwrap();
    registry
}

fn execute(w: &mut World, caller: Address, registry: Address) -> Result<SuccessionReport, SuccessionError> {
    match w.chain.execute(caller, Call::ExecuteSuccession { registry })? {
        CallOutcome::Succession(report) => Ok(report),
        other => panic!("expected a succession report, got {other:?}"),
    }
}

/// Make `heir` inherit one token from each of `count` fresh estates.
fn fill(w: &mut World, heir: Address, prefix: &str, count: usize) {
    let registries: Vec<Address> = (0..count)
        .map(|i| estate(w, account(&format!("{prefix}-{i}")), heir))
        .collect();
    w.chain.advance(days(180));
    for registry in registries {
        execute(w, heir, registry).unwrap();
    }
}

#[test]
fn stress_full_successor_rejects_new_estate() {
    let mut w = world();
    let heir = account("heir");
    fill(&mut w, heir, "junk", MAX_INHERITED_TOKENS);
    assert_eq!(w.chain.token().balance_of(heir), 8);

    let victim = account("victim");
    let registry = estate(&mut w, victim, heir);
    w.chain.advance(days(181));

    let err = execute(&mut w, heir, registry).unwrap_err();
    assert!(matches!(
        err,
        SuccessionError::InsufficientSpace {
            current: 8,
            incoming: 1,
            available: 0
        }
    ));
    assert_eq!(w.chain.current_controller(victim), victim);
}

#[test]
fn stress_seven_held_accepts_exactly_one_more() {
    let mut w = world();
    let heir = account("heir");
    fill(&mut w, heir, "prior", MAX_INHERITED_TOKENS - 1);

    let holder = account("holder");
    let registry = estate(&mut w, holder, heir);
    w.chain.advance(days(180));
    let report = execute(&mut w, heir, registry).unwrap();
    assert_eq!(report.transferred.len(), 1);
    assert!(!report.is_partial());
    assert_eq!(w.chain.token().balance_of(heir), MAX_INHERITED_TOKENS);
    assert_eq!(w.chain.current_controller(holder), heir);
}

#[test]
fn stress_partial_transfer_then_retry_after_burn() {
    let mut w = world();
    let hoarder = account("hoarder");
    let successor = account("successor");

    // Eight inherited tokens first (ids 1..=8), then the hoarder's own mint (id 9).
    fill(&mut w, hoarder, "estate", MAX_INHERITED_TOKENS);
    let registry = estate(&mut w, hoarder, successor);
    assert_eq!(w.chain.token().original_token_id(hoarder), Some(TokenId(9)));
    assert_eq!(w.chain.token().balance_of(hoarder), 9);

    w.chain.advance(days(180));
    let before = w.chain.events().len();
    let report = execute(&mut w, successor, registry).unwrap();

    assert_eq!(report.transferred.len(), 8);
    assert_eq!(report.transferred[0], TokenId(9));
    assert_eq!(report.skipped, vec![TokenId(8)]);
    assert!(report.is_partial());
    assert_eq!(w.chain.current_controller(hoarder), successor);

    let new_events: Vec<&Event> = w.chain.events()[before..].iter().map(|r| &r.event).collect();
    assert!(new_events.contains(&&Event::PartialTransfer {
        from: hoarder,
        to: successor,
        transferred: 8,
        skipped: 1,
    }));
    assert!(new_events.contains(&&Event::SuccessionExecuted {
        from: hoarder,
        to: successor,
        count: 8,
    }));

    // Full: the leftover cannot move yet.
    assert!(matches!(
        execute(&mut w, successor, registry),
        Err(SuccessionError::InsufficientSpace {
            current: 8,
            incoming: 1,
            available: 0
        })
    ));

    // Free one slot by burning an unwanted inherited token, then retry.
    w.chain
        .execute(successor, Call::Burn { token_id: TokenId(1) })
        .unwrap();
    let retry = execute(&mut w, successor, registry).unwrap();
    assert_eq!(retry.transferred, vec![TokenId(8)]);
    assert!(!retry.is_partial());
    assert_eq!(w.chain.token().balance_of(hoarder), 0);
    assert_eq!(w.chain.token().balance_of(successor), 8);
}

#[test]
fn stress_registry_transfer_never_exceeds_ceiling() {
    let mut w = world();
    let heir = account("heir");
    fill(&mut w, heir, "wave-a", MAX_INHERITED_TOKENS);

    // A second wave of estates: every attempt fails and changes nothing.
    let registries: Vec<Address> = (0..20)
        .map(|i| estate(&mut w, account(&format!("wave-b-{i}")), heir))
        .collect();
    w.chain.advance(days(365));
    for registry in registries {
        assert!(matches!(
            execute(&mut w, heir, registry),
            Err(SuccessionError::InsufficientSpace { .. })
        ));
    }
    assert_eq!(w.chain.token().balance_of(heir), MAX_INHERITED_TOKENS);
}

#[test]
fn stress_original_first_even_with_lower_inherited_ids() {
    let mut w = world();
    let holder = account("holder");
    let successor = account("successor");
    fill(&mut w, holder, "older", 3);
    let registry = estate(&mut w, holder, successor);
    let original = w.chain.token().original_token_id(holder).unwrap();
    assert_eq!(original, TokenId(4));

    w.chain.advance(days(180));
    let report = execute(&mut w, successor, registry).unwrap();
    assert_eq!(
        report.transferred,
        vec![original, TokenId(1), TokenId(2), TokenId(3)]
    );
}
