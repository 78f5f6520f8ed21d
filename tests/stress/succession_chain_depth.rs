//! Stress test: long chains of successive inheritance.
//!
//! Each heir mints, deploys a registry and names the next heir. Control of
//! every earlier holder must follow the tokens down the chain.

use agentic_succession::registry::WaitPeriod;
use agentic_succession::time::days;
use agentic_succession::{Address, Call, CallOutcome, Chain, Signer, TokenId, MAX_INHERITED_TOKENS};

fn account(i: usize) -> Address {
    Signer::from_seed(&format!("hop-{i}")).address()
}

fn deployed(outcome: CallOutcome) -> Address {
    match outcome {
        CallOutcome::Deployed(address) => address,
        other => panic!("expected a deployment, got {other:?}"),
    }
}

fn setup() -> (Chain, Address) {
    let gov = Signer::from_seed("governance").address();
    let mut chain = Chain::with_time(gov, 0);
    let factory = deployed(chain.execute(gov, Call::CreateFactory).unwrap());
    chain
        .execute(
            gov,
            Call::SetTrustedFactory {
                factory,
                trusted: true,
            },
        )
        .unwrap();
    (chain, factory)
}

/// Mint, deploy and configure for `holder`, then let `heir` claim.
fn hop(chain: &mut Chain, factory: Address, holder: Address, heir: Address) -> Vec<TokenId> {
    chain.execute(holder, Call::Mint).unwrap();
    let registry = deployed(chain.execute(holder, Call::DeployRegistry { factory }).unwrap());
    chain
        .execute(
            holder,
            Call::Configure {
                registry,
                successor: heir,
                wait_period: WaitPeriod::Short,
            },
        )
        .unwrap();
    chain.advance(days(180));
    match chain
        .execute(heir, Call::ExecuteSuccession { registry })
        .unwrap()
    {
        CallOutcome::Succession(report) => report.transferred,
        other => panic!("expected a succession report, got {other:?}"),
    }
}

#[test]
fn stress_eight_hop_chain_concentrates_control() {
    let (mut chain, factory) = setup();
    let hops = MAX_INHERITED_TOKENS;

    for i in 0..hops {
        let moved = hop(&mut chain, factory, account(i), account(i + 1));
        // Holder i carries their own token plus the i inherited ones.
        assert_eq!(moved.len(), i + 1);
        assert_eq!(moved[0], TokenId(i as u64 + 1));
    }

    let last = account(hops);
    assert_eq!(chain.token().balance_of(last), MAX_INHERITED_TOKENS);
    for i in 0..hops {
        assert_eq!(chain.current_controller(account(i)), last);
        assert_eq!(chain.token().balance_of(account(i)), 0);
    }
    assert!(chain.token().consistency_violations().is_empty());
}

#[test]
fn stress_fifty_hops_with_pruning() {
    let (mut chain, factory) = setup();
    let hops = 50;

    for i in 0..hops {
        let holder = account(i);
        // Keep only the token of the immediate predecessor.
        if i >= 2 {
            let older = chain.token().original_token_id(account(i - 2)).unwrap();
            chain
                .execute(holder, Call::Burn { token_id: older })
                .unwrap();
        }
        let moved = hop(&mut chain, factory, holder, account(i + 1));
        assert_eq!(moved.len(), if i == 0 { 1 } else { 2 });
    }

    let last = account(hops);
    assert_eq!(chain.token().balance_of(last), 2);
    assert_eq!(chain.current_controller(account(hops - 1)), last);
    assert_eq!(chain.current_controller(account(hops - 2)), last);
    for i in 0..hops - 2 {
        assert!(chain.current_controller(account(i)).is_zero());
        // Burned tokens keep their attribution.
        assert!(chain.token().has_minted(account(i)));
    }
    assert_eq!(chain.token().total_supply(), 2);
    assert_eq!(chain.token().next_token_id(), TokenId(hops as u64 + 1));
    assert!(chain.token().consistency_violations().is_empty());
}

#[test]
fn stress_chain_event_log_is_contiguous() {
    let (mut chain, factory) = setup();
    for i in 0..5 {
        hop(&mut chain, factory, account(i), account(i + 1));
    }
    let events = chain.events();
    for (i, record) in events.iter().enumerate() {
        assert_eq!(record.sequence, i as u64);
    }
    let executions = events
        .iter()
        .filter(|r| r.event.as_tag() == "succession_executed")
        .count();
    assert_eq!(executions, 5);
    for pair in events.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}
