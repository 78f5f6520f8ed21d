//! Integration test: signed call submission, nonces, and persistence.

use agentic_succession::registry::WaitPeriod;
use agentic_succession::storage::{load_account, load_state, save_account, save_state};
use agentic_succession::time::days;
use agentic_succession::{Call, CallOutcome, Chain, SignedCall, Signer, SuccessionError, TokenId};

fn submit(chain: &mut Chain, signer: &Signer, call: Call) -> Result<CallOutcome, SuccessionError> {
    let nonce = chain.nonce(signer.address());
    let signed = SignedCall::sign(signer, nonce, call).expect("signing should succeed");
    chain.submit(&signed)
}

fn deployed(outcome: CallOutcome) -> agentic_succession::Address {
    match outcome {
        CallOutcome::Deployed(address) => address,
        other => panic!("expected a deployment, got {other:?}"),
    }
}

#[test]
fn full_workflow_signed_succession() {
    let gov = Signer::from_seed("gov");
    let alice = Signer::from_seed("alice");
    let bob = Signer::from_seed("bob");
    let mut chain = Chain::with_time(gov.address(), 0);

    let factory = deployed(submit(&mut chain, &gov, Call::CreateFactory).unwrap());
    submit(
        &mut chain,
        &gov,
        Call::SetTrustedFactory {
            factory,
            trusted: true,
        },
    )
    .unwrap();

    assert_eq!(
        submit(&mut chain, &alice, Call::Mint).unwrap(),
        CallOutcome::Minted(TokenId(1))
    );
    let registry = deployed(submit(&mut chain, &alice, Call::DeployRegistry { factory }).unwrap());
    submit(
        &mut chain,
        &alice,
        Call::Configure {
            registry,
            successor: bob.address(),
            wait_period: WaitPeriod::Long,
        },
    )
    .unwrap();
    assert_eq!(chain.nonce(alice.address()), 3);

    chain.advance(days(365));
    submit(&mut chain, &bob, Call::ExecuteSuccession { registry }).unwrap();
    assert_eq!(chain.current_controller(alice.address()), bob.address());
}

#[test]
fn edge_replayed_call_rejected() {
    let gov = Signer::from_seed("gov");
    let alice = Signer::from_seed("alice");
    let mut chain = Chain::with_time(gov.address(), 0);

    let signed = SignedCall::sign(&alice, 0, Call::Mint).unwrap();
    chain.submit(&signed).unwrap();
    assert!(matches!(
        chain.submit(&signed),
        Err(SuccessionError::InvalidNonce {
            expected: 1,
            actual: 0
        })
    ));
}

#[test]
fn edge_future_nonce_rejected_without_consuming() {
    let gov = Signer::from_seed("gov");
    let alice = Signer::from_seed("alice");
    let mut chain = Chain::with_time(gov.address(), 0);

    let early = SignedCall::sign(&alice, 5, Call::Mint).unwrap();
    assert!(matches!(
        chain.submit(&early),
        Err(SuccessionError::InvalidNonce {
            expected: 0,
            actual: 5
        })
    ));
    assert_eq!(chain.nonce(alice.address()), 0);
}

#[test]
fn edge_failed_call_still_consumes_nonce() {
    let gov = Signer::from_seed("gov");
    let alice = Signer::from_seed("alice");
    let mut chain = Chain::with_time(gov.address(), 0);

    submit(&mut chain, &alice, Call::Mint).unwrap();
    assert!(matches!(
        submit(&mut chain, &alice, Call::Mint),
        Err(SuccessionError::AlreadyMinted(_))
    ));
    assert_eq!(chain.nonce(alice.address()), 2);
    assert_eq!(chain.token().total_supply(), 1);
}

#[test]
fn edge_forged_signature_rejected() {
    let gov = Signer::from_seed("gov");
    let mallory = Signer::from_seed("mallory");
    let mut chain = Chain::with_time(gov.address(), 0);

    // Mallory signs a governance call and swaps in the governance key.
    let mut forged = SignedCall::sign(
        &mallory,
        0,
        Call::SetTrustedFactory {
            factory: mallory.address(),
            trusted: true,
        },
    )
    .unwrap();
    forged.signer_key = gov.public_key_base64();
    assert!(matches!(
        chain.submit(&forged),
        Err(SuccessionError::SignatureInvalid)
    ));
    assert!(!chain.token().is_trusted_factory(mallory.address()));

    // Signed honestly, the call is simply not governance.
    assert!(matches!(
        submit(
            &mut chain,
            &mallory,
            Call::SetTrustedFactory {
                factory: mallory.address(),
                trusted: true,
            },
        ),
        Err(SuccessionError::NotGovernance)
    ));
}

#[test]
fn full_workflow_persisted_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let key_path = dir.path().join("accounts").join("alice.ask");

    let gov = Signer::from_seed("gov");
    let alice = Signer::generate(Some("alice".into()));
    save_account(&alice, &key_path, "alice-pass").unwrap();

    {
        let mut chain = Chain::with_time(gov.address(), 10);
        let signer = load_account(&key_path, "alice-pass").unwrap();
        submit(&mut chain, &signer, Call::Mint).unwrap();
        save_state(chain.state(), &state_path).unwrap();
    }

    let mut chain = Chain::from_state(load_state(&state_path).unwrap());
    let signer = load_account(&key_path, "alice-pass").unwrap();
    assert_eq!(chain.nonce(signer.address()), 1);
    assert!(matches!(
        submit(&mut chain, &signer, Call::Mint),
        Err(SuccessionError::AlreadyMinted(_))
    ));
    assert_eq!(chain.current_controller(alice.address()), alice.address());
}
