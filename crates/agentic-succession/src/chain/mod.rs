//! Execution environment: atomic, totally ordered calls against all
//! deployed instances.
//!
//! Every call runs against a snapshot of the instances. If any step fails,
//! the snapshot is restored and the call's buffered events are dropped, so a
//! call either applies completely or not at all. Calls are applied in the
//! order they are submitted.
//!
//! Accounts may register a [`TokenReceiver`]. When a registry moves a token
//! to such an account, the chain notifies the receiver while the token's
//! reentrancy lock is still held and runs any call the receiver returns as
//! a nested call. A nested call that reaches a held lock fails with
//! `ReentrantCall` and aborts the whole outer call.

pub mod call;
pub mod state;

use std::collections::HashMap;

pub use call::{Call, CallOutcome};
pub use state::{ChainState, Instances, StateDirectory};

use crate::context::CallContext;
use crate::error::{Result, SuccessionError};
use crate::events::{Event, EventRecord};
use crate::factory::RegistryFactory;
use crate::identity::Address;
use crate::registry::{SuccessionRegistry, SuccessionReport};
use crate::resource::ControlledResource;
use crate::time;
use crate::token::{AuthorityToken, TokenId};
use crate::tx::SignedCall;

/// Hook run when an account receives a token through succession.
pub trait TokenReceiver: Send {
    /// Called after `token_id` moved from `from` to this account on behalf
    /// of `operator`. A returned call is executed as this account.
    fn on_token_received(
        &mut self,
        operator: Address,
        from: Address,
        token_id: TokenId,
    ) -> Option<Call>;
}

/// The shared execution environment.
pub struct Chain {
    state: ChainState,
    receivers: HashMap<Address, Box<dyn TokenReceiver>>,
}

impl Chain {
    /// A new chain administered by `governance`, clock at the current time.
    pub fn new(governance: Address) -> Self {
        Self::with_time(governance, time::now_secs())
    }

    /// A new chain with its clock set to `now`.
    pub fn with_time(governance: Address, now: u64) -> Self {
        Self::from_state(ChainState::new(governance, now))
    }

    /// Resume from persisted state. Receivers are not persisted.
    pub fn from_state(state: ChainState) -> Self {
        Self {
            state,
            receivers: HashMap::new(),
        }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn into_state(self) -> ChainState {
        self.state
    }

    // ── Clock ────────────────────────────────────────────────────────────

    pub fn now(&self) -> u64 {
        self.state.now
    }

    pub fn advance(&mut self, secs: u64) {
        self.state.now = self.state.now.saturating_add(secs);
        log::debug!("clock advanced to {}", self.state.now);
    }

    pub fn set_time(&mut self, now: u64) {
        self.state.now = now;
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Verify and apply a signed call.
    ///
    /// The nonce is consumed once the signature and nonce check pass, even
    /// if the call itself then fails.
    pub fn submit(&mut self, signed: &SignedCall) -> Result<CallOutcome> {
        let signer = signed.verify()?;
        let expected = self.nonce(signer);
        if signed.nonce != expected {
            return Err(SuccessionError::InvalidNonce {
                expected,
                actual: signed.nonce,
            });
        }
        self.state.nonces.insert(signer, expected + 1);
        self.execute(signer, signed.call.clone())
    }

    /// Apply `call` as `caller`, atomically.
    pub fn execute(&mut self, caller: Address, call: Call) -> Result<CallOutcome> {
        let name = call.name();
        let snapshot = self.state.instances.clone();
        let mut ctx = CallContext::new(caller, self.state.now);

        match self.dispatch(&mut ctx, call) {
            Ok(outcome) => {
                let events = ctx.into_events();
                log::debug!(
                    "{name} by {} applied, {} event(s)",
                    caller.short(),
                    events.len()
                );
                self.append_events(caller, events);
                Ok(outcome)
            }
            Err(e) => {
                self.state.instances = snapshot;
                log::debug!("{name} by {} rejected: {e}", caller.short());
                Err(e)
            }
        }
    }

    fn append_events(&mut self, submitted_by: Address, events: Vec<Event>) {
        let timestamp = self.state.now;
        for event in events {
            let sequence = self.state.events.len() as u64;
            self.state.events.push(EventRecord {
                sequence,
                timestamp,
                submitted_by,
                event,
            });
        }
    }

    fn dispatch(&mut self, ctx: &mut CallContext, call: Call) -> Result<CallOutcome> {
        let inst = &mut self.state.instances;
        match call {
            Call::Mint => inst.token.mint(ctx).map(CallOutcome::Minted),
            Call::Burn { token_id } => inst.token.burn(ctx, token_id).map(|_| CallOutcome::Done),
            Call::Transfer { to, token_id } => inst
                .token
                .transfer(ctx, to, token_id)
                .map(|_| CallOutcome::Done),
            Call::TransferFrom { from, to, token_id } => inst
                .token
                .transfer_from(ctx, from, to, token_id)
                .map(|_| CallOutcome::Done),
            Call::Approve { spender, token_id } => inst
                .token
                .approve(ctx, spender, token_id)
                .map(|_| CallOutcome::Done),
            Call::SetApprovalForAll { operator, approved } => inst
                .token
                .set_approval_for_all(ctx, operator, approved)
                .map(|_| CallOutcome::Done),
            Call::SetTrustedFactory { factory, trusted } => inst
                .token
                .set_trusted_factory(ctx, factory, trusted)
                .map(|_| CallOutcome::Done),
            Call::AuthorizeRegistry { holder, registry } => {
                let directory = StateDirectory::new(&inst.factories, &inst.registries);
                inst.token
                    .authorize_registry(ctx, holder, registry, &directory)?;
                Ok(CallOutcome::Done)
            }

            Call::CreateFactory => self.create_factory(ctx).map(CallOutcome::Deployed),
            Call::DeployRegistry { factory } => {
                self.deploy_registry(ctx, factory).map(CallOutcome::Deployed)
            }
            Call::DeployResource { factory } => {
                self.deploy_resource(ctx, factory).map(CallOutcome::Deployed)
            }

            Call::Configure {
                registry,
                successor,
                wait_period,
            } => inst
                .registry_mut(registry)?
                .configure(ctx, successor, wait_period)
                .map(|_| CallOutcome::Done),
            Call::UpdateSuccessor {
                registry,
                successor,
            } => inst
                .registry_mut(registry)?
                .update_successor(ctx, successor)
                .map(|_| CallOutcome::Done),
            Call::CheckIn { registry } => inst
                .registry_mut(registry)?
                .check_in(ctx)
                .map(|_| CallOutcome::Done),
            Call::ExecuteSuccession { registry } => self
                .execute_succession(ctx, registry)
                .map(CallOutcome::Succession),

            Call::SetEntry {
                resource,
                key,
                value,
            } => {
                let target = inst
                    .resources
                    .get_mut(&resource)
                    .ok_or(SuccessionError::UnknownInstance(resource))?;
                target.set_entry(ctx, &inst.token, key, value)?;
                Ok(CallOutcome::Done)
            }
        }
    }

    // ── Factory calls ────────────────────────────────────────────────────

    fn create_factory(&mut self, ctx: &mut CallContext) -> Result<Address> {
        let inst = &mut self.state.instances;
        let creator = ctx.caller();
        inst.factory_count += 1;
        let address = Address::derive(
            "agentic-succession/factory",
            &[
                &creator.as_bytes()[..],
                &inst.factory_count.to_be_bytes()[..],
            ],
        );
        inst.factories
            .insert(address, RegistryFactory::new(address, creator));
        ctx.emit(Event::FactoryCreated {
            factory: address,
            creator,
        });
        Ok(address)
    }

    /// Deploy, initialize and authorize a registry for the caller.
    fn deploy_registry(&mut self, ctx: &mut CallContext, factory: Address) -> Result<Address> {
        let holder = ctx.caller();
        let inst = &mut self.state.instances;
        let token_address = inst.token.address();

        let records = inst
            .factories
            .get_mut(&factory)
            .ok_or(SuccessionError::UnknownInstance(factory))?;
        records.ensure_token_holder(&inst.token, holder)?;

        let mut fctx = ctx.nested(factory);
        let address = records.record_registry(&mut fctx, holder)?;
        let mut registry = SuccessionRegistry::new(address);
        registry.initialize(&mut fctx, holder, token_address)?;
        inst.registries.insert(address, registry);

        let directory = StateDirectory::new(&inst.factories, &inst.registries);
        inst.token
            .authorize_registry(&mut fctx, holder, address, &directory)?;

        ctx.absorb(fctx);
        Ok(address)
    }

    /// Deploy and initialize a linked resource for the caller.
    fn deploy_resource(&mut self, ctx: &mut CallContext, factory: Address) -> Result<Address> {
        let holder = ctx.caller();
        let inst = &mut self.state.instances;
        let token_address = inst.token.address();

        let records = inst
            .factories
            .get_mut(&factory)
            .ok_or(SuccessionError::UnknownInstance(factory))?;
        records.ensure_token_holder(&inst.token, holder)?;

        let mut fctx = ctx.nested(factory);
        let address = records.record_resource(&mut fctx, holder);
        let mut resource = ControlledResource::new(address);
        resource.initialize(&mut fctx, token_address, holder)?;
        inst.resources.insert(address, resource);

        ctx.absorb(fctx);
        Ok(address)
    }

    // ── Succession ───────────────────────────────────────────────────────

    fn execute_succession(
        &mut self,
        ctx: &mut CallContext,
        registry: Address,
    ) -> Result<SuccessionReport> {
        let target = self.state.instances.registry(registry)?;
        let _execution = target.begin_execution()?;
        let plan = target.plan_succession(ctx.caller(), ctx.timestamp(), &self.state.instances.token)?;

        let mut rctx = ctx.nested(registry);
        for token_id in &plan.transfers {
            self.registry_transfer(&mut rctx, plan.from, plan.to, *token_id)?;
        }
        ctx.absorb(rctx);

        let report = self
            .state
            .instances
            .registry(registry)?
            .finish_succession(ctx, plan);
        Ok(report)
    }

    /// Move one token on behalf of the registry in `ctx`, then notify the
    /// recipient with the token still locked.
    fn registry_transfer(
        &mut self,
        ctx: &mut CallContext,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<()> {
        let _transfer = self
            .state
            .instances
            .token
            .transfer_by_registry(ctx, from, to, token_id)?;
        self.notify_receiver(ctx, from, to, token_id)
    }

    fn notify_receiver(
        &mut self,
        ctx: &mut CallContext,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<()> {
        let operator = ctx.caller();
        let Some(receiver) = self.receivers.get_mut(&to) else {
            return Ok(());
        };
        let Some(callback) = receiver.on_token_received(operator, from, token_id) else {
            return Ok(());
        };

        log::debug!("{} called back with {}", to.short(), callback.name());
        let mut nested = ctx.nested(to);
        self.dispatch(&mut nested, callback)?;
        ctx.absorb(nested);
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn governance(&self) -> Address {
        self.state.governance
    }

    pub fn token(&self) -> &AuthorityToken {
        &self.state.instances.token
    }

    pub fn registry(&self, address: Address) -> Result<&SuccessionRegistry> {
        self.state.instances.registry(address)
    }

    pub fn resource(&self, address: Address) -> Result<&ControlledResource> {
        self.state
            .instances
            .resources
            .get(&address)
            .ok_or(SuccessionError::UnknownInstance(address))
    }

    pub fn factory(&self, address: Address) -> Result<&RegistryFactory> {
        self.state
            .instances
            .factories
            .get(&address)
            .ok_or(SuccessionError::UnknownInstance(address))
    }

    pub fn factories(&self) -> impl Iterator<Item = &RegistryFactory> {
        self.state.instances.factories.values()
    }

    /// The registry owned by `holder`, if one was deployed.
    pub fn registry_of(&self, holder: Address) -> Option<&SuccessionRegistry> {
        self.state
            .instances
            .registries
            .values()
            .find(|r| r.owner() == holder)
    }

    pub fn current_controller(&self, original_holder: Address) -> Address {
        self.state
            .instances
            .token
            .get_current_controller(original_holder)
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.state.events
    }

    /// Next nonce `signer` must use.
    pub fn nonce(&self, signer: Address) -> u64 {
        self.state.nonces.get(&signer).copied().unwrap_or(0)
    }

    /// Install a hook for tokens arriving at `account`.
    pub fn register_receiver(&mut self, account: Address, receiver: Box<dyn TokenReceiver>) {
        self.receivers.insert(account, receiver);
    }

    pub fn remove_receiver(&mut self, account: Address) -> Option<Box<dyn TokenReceiver>> {
        self.receivers.remove(&account)
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("now", &self.state.now)
            .field("events", &self.state.events.len())
            .field("receivers", &self.receivers.len())
            .finish_non_exhaustive()
    }
}
