//! Stress test: ledger invariants under a long randomized call sequence.
//!
//! A seeded generator drives mints, deployments, policy changes, check-ins,
//! clock jumps, executions and burns from a pool of accounts. Calls are
//! allowed to fail; after every call the ledger must still satisfy its
//! invariants.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use agentic_succession::registry::WaitPeriod;
use agentic_succession::time::days;
use agentic_succession::{
    Address, Call, CallOutcome, Chain, Signer, TokenId, MAX_INHERITED_TOKENS,
};

const ACCOUNTS: usize = 12;

struct Harness {
    chain: Chain,
    factory: Address,
    accounts: Vec<Address>,
    /// Registry per account, once deployed.
    registries: HashMap<Address, Address>,
    /// Every authorization observed so far.
    authorized: HashSet<(Address, Address)>,
    /// Original attribution observed at mint time.
    originals: HashMap<Address, TokenId>,
}

impl Harness {
    fn new() -> Self {
        let gov = Signer::from_seed("governance").address();
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
        let accounts = (0..ACCOUNTS)
            .map(|i| Signer::from_seed(&format!("acct-{i}")).address())
            .collect();
        Self {
            chain,
            factory,
            accounts,
            registries: HashMap::new(),
            authorized: HashSet::new(),
            originals: HashMap::new(),
        }
    }

    fn pick(&self, rng: &mut StdRng) -> Address {
        self.accounts[rng.gen_range(0..self.accounts.len())]
    }

    fn step(&mut self, rng: &mut StdRng) {
        let caller = self.pick(rng);
        let call = match rng.gen_range(0..8) {
            0 => Call::Mint,
            1 => Call::DeployRegistry {
                factory: self.factory,
            },
            2 | 3 => {
                let Some(&registry) = self.registries.get(&caller) else {
                    return;
                };
                let successor = self.pick(rng);
                if self.chain.registry(registry).unwrap().is_configured() {
                    Call::UpdateSuccessor {
                        registry,
                        successor,
                    }
                } else {
                    let wait_period = if rng.gen_bool(0.5) {
                        WaitPeriod::Short
                    } else {
                        WaitPeriod::Long
                    };
                    Call::Configure {
                        registry,
                        successor,
                        wait_period,
                    }
                }
            }
            4 => {
                let Some(&registry) = self.registries.get(&caller) else {
                    return;
                };
                Call::CheckIn { registry }
            }
            5 => {
                self.chain.advance(days(rng.gen_range(1..200)));
                return;
            }
            6 => {
                // Usually the named successor, sometimes a stranger.
                let owner = self.pick(rng);
                let Some(&registry) = self.registries.get(&owner) else {
                    return;
                };
                let named = self
                    .chain
                    .registry(registry)
                    .unwrap()
                    .policy()
                    .map(|p| p.successor);
                let executor = match named {
                    Some(s) if rng.gen_bool(0.8) => s,
                    _ => caller,
                };
                self.execute(executor, registry);
                return;
            }
            _ => {
                let held = self.chain.token().owned_tokens(caller);
                if held.is_empty() {
                    return;
                }
                Call::Burn {
                    token_id: held[rng.gen_range(0..held.len())],
                }
            }
        };

        match self.chain.execute(caller, call) {
            Ok(CallOutcome::Deployed(registry)) => {
                self.registries.insert(caller, registry);
            }
            Ok(CallOutcome::Minted(id)) => {
                self.originals.insert(caller, id);
            }
            _ => {}
        }
    }

    fn execute(&mut self, executor: Address, registry: Address) {
        let owner = self.chain.registry(registry).unwrap().owner();
        let pending = self.chain.token().owned_tokens(owner);
        let original = self.chain.token().original_token_id(owner);

        if let Ok(CallOutcome::Succession(report)) = self
            .chain
            .execute(executor, Call::ExecuteSuccession { registry })
        {
            assert!(!report.transferred.is_empty());
            assert!(report.transferred.len() <= MAX_INHERITED_TOKENS);
            assert_eq!(report.transferred.len() + report.skipped.len(), pending.len());
            if let Some(original) = original.filter(|id| pending.contains(id)) {
                assert_eq!(report.transferred[0], original);
            }
        }
    }

    fn check(&mut self) {
        let token = self.chain.token();
        assert!(
            token.consistency_violations().is_empty(),
            "{:?}",
            token.consistency_violations()
        );

        let mut held_total = 0;
        for &account in &self.accounts {
            let original = token.original_token_id(account);
            assert_eq!(token.has_minted(account), original.is_some());
            assert_eq!(original, self.originals.get(&account).copied());
            if let Some(id) = original {
                assert_eq!(token.original_holder_of(id), Some(account));
                let controller = token.get_current_controller(account);
                assert_eq!(token.owner_of(id).unwrap_or(Address::ZERO), controller);
            }

            let held = token.owned_tokens(account);
            held_total += held.len();
            let inherited = held.iter().filter(|id| Some(**id) != original).count();
            assert!(inherited <= MAX_INHERITED_TOKENS);

            if let Some(&registry) = self.registries.get(&account) {
                if token.is_authorized_registry(account, registry) {
                    self.authorized.insert((account, registry));
                }
            }
        }
        assert_eq!(held_total, token.total_supply());
        for &(holder, registry) in &self.authorized {
            assert!(token.is_authorized_registry(holder, registry));
        }
    }
}

#[test]
fn stress_randomized_sequence_preserves_invariants() {
    for seed in [7_u64, 42, 1337] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut h = Harness::new();
        for _ in 0..600 {
            h.step(&mut rng);
            h.check();
        }
        for (i, record) in h.chain.events().iter().enumerate() {
            assert_eq!(record.sequence, i as u64);
        }
    }
}

#[test]
fn stress_every_deployed_registry_is_authorized() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut h = Harness::new();
    for _ in 0..300 {
        h.step(&mut rng);
    }
    for (&holder, &registry) in &h.registries {
        let reg = h.chain.registry(registry).unwrap();
        assert_eq!(reg.owner(), holder);
        assert!(h.chain.token().is_authorized_registry(holder, registry));
        assert_eq!(h.chain.registry_of(holder).map(|r| r.address()), Some(registry));
    }
}
