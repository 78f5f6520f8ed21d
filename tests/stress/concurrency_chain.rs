//! Concurrency test: many threads driving one shared chain.
//!
//! The chain is shared behind a mutex; calls from different threads must
//! interleave without losing updates, and contended executions must apply
//! exactly once.

use std::sync::{Arc, Mutex};
use std::thread;

use agentic_succession::registry::WaitPeriod;
use agentic_succession::time::days;
use agentic_succession::{
    Address, Call, CallOutcome, Chain, SignedCall, Signer, SuccessionError,
};

fn deployed(outcome: CallOutcome) -> Address {
    match outcome {
        CallOutcome::Deployed(address) => address,
        other => panic!("expected a deployment, got {other:?}"),
    }
}

fn shared_chain() -> (Arc<Mutex<Chain>>, Address) {
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
    (Arc::new(Mutex::new(chain)), factory)
}

fn submit(chain: &Mutex<Chain>, signer: &Signer, call: Call) -> Result<CallOutcome, SuccessionError> {
    let mut chain = chain.lock().unwrap();
    let nonce = chain.nonce(signer.address());
    let signed = SignedCall::sign(signer, nonce, call).expect("signing should succeed");
    chain.submit(&signed)
}

#[test]
fn stress_32_concurrent_estates() {
    let (chain, factory) = shared_chain();

    let mut handles = Vec::new();
    for t in 0..32 {
        let chain = Arc::clone(&chain);
        handles.push(thread::spawn(move || {
            let owner = Signer::from_seed(&format!("owner-{t}"));
            let heir = Signer::from_seed(&format!("heir-{t}")).address();
            submit(&chain, &owner, Call::Mint).unwrap();
            let registry = deployed(submit(&chain, &owner, Call::DeployRegistry { factory }).unwrap());
            submit(
                &chain,
                &owner,
                Call::Configure {
                    registry,
                    successor: heir,
                    wait_period: WaitPeriod::Short,
                },
            )
            .unwrap();
            registry
        }));
    }
    let registries: Vec<Address> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    chain.lock().unwrap().advance(days(180));

    let mut handles = Vec::new();
    for (t, registry) in registries.into_iter().enumerate() {
        let chain = Arc::clone(&chain);
        handles.push(thread::spawn(move || {
            let heir = Signer::from_seed(&format!("heir-{t}"));
            submit(&chain, &heir, Call::ExecuteSuccession { registry }).unwrap();
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let chain = chain.lock().unwrap();
    assert_eq!(chain.token().total_supply(), 32);
    for t in 0..32 {
        let owner = Signer::from_seed(&format!("owner-{t}")).address();
        let heir = Signer::from_seed(&format!("heir-{t}")).address();
        assert_eq!(chain.current_controller(owner), heir);
        assert_eq!(chain.nonce(owner), 3);
        assert_eq!(chain.nonce(heir), 1);
    }
    for (i, record) in chain.events().iter().enumerate() {
        assert_eq!(record.sequence, i as u64);
    }
    assert!(chain.token().consistency_violations().is_empty());
}

#[test]
fn stress_contending_executions_apply_once() {
    let (chain, factory) = shared_chain();
    let owner = Signer::from_seed("owner").address();
    let heir = Signer::from_seed("heir").address();
    let registry = {
        let mut c = chain.lock().unwrap();
        c.execute(owner, Call::Mint).unwrap();
        let registry = deployed(c.execute(owner, Call::DeployRegistry { factory }).unwrap());
        c.execute(
            owner,
            Call::Configure {
                registry,
                successor: heir,
                wait_period: WaitPeriod::Long,
            },
        )
        .unwrap();
        c.advance(days(365));
        registry
    };

    let mut handles = Vec::new();
    for _ in 0..16 {
        let chain = Arc::clone(&chain);
        handles.push(thread::spawn(move || {
            chain
                .lock()
                .unwrap()
                .execute(heir, Call::ExecuteSuccession { registry })
        }));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, SuccessionError::NoNFTsToTransfer)));
    assert_eq!(chain.lock().unwrap().current_controller(owner), heir);
}

#[test]
fn stress_readers_see_whole_calls() {
    let (chain, factory) = shared_chain();
    let owner = Signer::from_seed("owner").address();
    let heir = Signer::from_seed("heir").address();
    {
        let mut c = chain.lock().unwrap();
        c.execute(owner, Call::Mint).unwrap();
        let registry = deployed(c.execute(owner, Call::DeployRegistry { factory }).unwrap());
        c.execute(
            owner,
            Call::Configure {
                registry,
                successor: heir,
                wait_period: WaitPeriod::Short,
            },
        )
        .unwrap();
        c.advance(days(180));
    }

    let mut readers = Vec::new();
    for _ in 0..8 {
        let chain = Arc::clone(&chain);
        readers.push(thread::spawn(move || {
            for _ in 0..200 {
                let c = chain.lock().unwrap();
                let controller = c.current_controller(owner);
                assert!(controller == owner || controller == heir);
                assert!(c.token().consistency_violations().is_empty());
            }
        }));
    }

    let writer = {
        let chain = Arc::clone(&chain);
        thread::spawn(move || {
            let mut c = chain.lock().unwrap();
            let registry = c.registry_of(owner).unwrap().address();
            c.execute(heir, Call::ExecuteSuccession { registry }).unwrap();
        })
    };

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(chain.lock().unwrap().current_controller(owner), heir);
}
