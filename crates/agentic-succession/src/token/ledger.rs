//! Authority token ledger.
//!
//! All ownership bookkeeping is private to [`AuthorityToken`]; other
//! components only read it through the query methods.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::{Result, SuccessionError};
use crate::events::Event;
use crate::guard::{LockScope, ReentrancyLock};
use crate::identity::Address;

use super::owned::OwnedTokenSet;
use super::types::{TokenId, MAX_INHERITED_TOKENS};

/// Read access to factory and registry bookkeeping, used to double-check a
/// registry authorization request.
pub trait RegistryDirectory {
    /// The registry `factory` tracks for `holder`, if any.
    fn registry_tracked_by(&self, factory: Address, holder: Address) -> Option<Address>;

    /// The administrative owner of `registry`, if it exists and is initialized.
    fn registry_owner(&self, registry: Address) -> Option<Address>;
}

/// The authority token instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityToken {
    address: Address,
    governance: Address,
    next_id: u64,
    /// Owner of every live token.
    owners: BTreeMap<TokenId, Address>,
    /// Holder → the token they minted. Never removed, even if an heir burns
    /// the token; doubles as `has_minted`.
    original_token_id: BTreeMap<Address, TokenId>,
    /// Reverse of `original_token_id`.
    original_holder_of: BTreeMap<TokenId, Address>,
    owned_tokens: BTreeMap<Address, OwnedTokenSet>,
    /// Holder → registries allowed to move that holder's tokens. Never revoked.
    authorized_registries: BTreeMap<Address, BTreeSet<Address>>,
    trusted_factories: BTreeSet<Address>,
    #[serde(skip)]
    lock: ReentrancyLock,
}

impl AuthorityToken {
    /// Create an empty token instance at `address` administered by `governance`.
    pub fn new(address: Address, governance: Address) -> Self {
        Self {
            address,
            governance,
            next_id: 1,
            owners: BTreeMap::new(),
            original_token_id: BTreeMap::new(),
            original_holder_of: BTreeMap::new(),
            owned_tokens: BTreeMap::new(),
            authorized_registries: BTreeMap::new(),
            trusted_factories: BTreeSet::new(),
            lock: ReentrancyLock::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn governance(&self) -> Address {
        self.governance
    }

    // ── Mint / burn ──────────────────────────────────────────────────────

    /// Mint the caller's original token. Exactly once per holder.
    ///
    /// The capacity ceiling applies to succession transfers, not to this one
    /// mint, so a holder can always claim their own original token.
    pub fn mint(&mut self, ctx: &mut CallContext) -> Result<TokenId> {
        let _scope = self.lock.enter()?;
        let holder = ctx.caller();
        if holder.is_zero() {
            return Err(SuccessionError::ZeroAddress);
        }
        if self.original_token_id.contains_key(&holder) {
            return Err(SuccessionError::AlreadyMinted(holder));
        }

        let token_id = TokenId(self.next_id);
        self.next_id += 1;

        self.original_token_id.insert(holder, token_id);
        self.original_holder_of.insert(token_id, holder);
        self.owners.insert(token_id, holder);
        self.owned_tokens.entry(holder).or_default().insert(token_id);

        log::info!("minted authority token {token_id} for {}", holder.short());
        ctx.emit(Event::Minted { holder, token_id });
        Ok(token_id)
    }

    /// Burn a token the caller owns.
    ///
    /// A holder can never burn their own original token, whoever holds it
    /// now: that would orphan every resource bound to them. Inherited tokens
    /// may be burned by their owner to free capacity, which gives up the
    /// authority they carried.
    pub fn burn(&mut self, ctx: &mut CallContext, token_id: TokenId) -> Result<()> {
        let _scope = self.lock.enter()?;
        let caller = ctx.caller();

        if self.original_token_id.get(&caller) == Some(&token_id) {
            return Err(SuccessionError::CannotBurnOriginalToken(token_id));
        }
        if self.owners.get(&token_id) != Some(&caller) {
            return Err(SuccessionError::NotAuthorized(format!(
                "{caller} does not own token {token_id}"
            )));
        }

        self.owned_tokens
            .get_mut(&caller)
            .ok_or(SuccessionError::TokenNotFound(token_id))?
            .remove(token_id)?;
        self.owners.remove(&token_id);

        log::debug!(
            "{} burned inherited token {token_id}, original holder {}",
            caller.short(),
            self.original_holder_of
                .get(&token_id)
                .map_or_else(|| "none".to_string(), Address::short)
        );
        ctx.emit(Event::Burned {
            holder: caller,
            token_id,
        });
        Ok(())
    }

    // ── Governance and authorization ─────────────────────────────────────

    /// Add or remove a factory from the trusted allow-list.
    pub fn set_trusted_factory(
        &mut self,
        ctx: &mut CallContext,
        factory: Address,
        trusted: bool,
    ) -> Result<()> {
        let _scope = self.lock.enter()?;
        if ctx.caller() != self.governance {
            return Err(SuccessionError::NotGovernance);
        }
        if factory.is_zero() {
            return Err(SuccessionError::ZeroAddress);
        }
        if trusted {
            self.trusted_factories.insert(factory);
        } else {
            self.trusted_factories.remove(&factory);
        }
        ctx.emit(Event::TrustedFactoryUpdated { factory, trusted });
        Ok(())
    }

    /// Permanently allow `registry` to move `holder`'s tokens.
    ///
    /// The caller must be a trusted factory, that factory must itself track
    /// `registry` as `holder`'s registry, and the registry's owner must be
    /// `holder`. A compromised factory therefore cannot point a holder's
    /// authority at a registry the holder does not own.
    pub fn authorize_registry(
        &mut self,
        ctx: &mut CallContext,
        holder: Address,
        registry: Address,
        directory: &dyn RegistryDirectory,
    ) -> Result<()> {
        let _scope = self.lock.enter()?;
        let factory = ctx.caller();
        if !self.trusted_factories.contains(&factory) {
            return Err(SuccessionError::NotTrustedFactory(factory));
        }
        if holder.is_zero() || registry.is_zero() {
            return Err(SuccessionError::ZeroAddress);
        }
        if directory.registry_tracked_by(factory, holder) != Some(registry) {
            return Err(SuccessionError::NotAuthorized(format!(
                "factory {factory} does not track {registry} for {holder}"
            )));
        }
        if directory.registry_owner(registry) != Some(holder) {
            return Err(SuccessionError::NotAuthorized(format!(
                "registry {registry} is not owned by {holder}"
            )));
        }

        self.authorized_registries
            .entry(holder)
            .or_default()
            .insert(registry);

        log::info!(
            "registry {} authorized for {}",
            registry.short(),
            holder.short()
        );
        ctx.emit(Event::RegistryAuthorized {
            holder,
            registry,
            authorized: true,
        });
        Ok(())
    }

    // ── Transfer mediation ───────────────────────────────────────────────

    /// Direct transfers are disabled.
    pub fn transfer(&mut self, _ctx: &mut CallContext, _to: Address, _id: TokenId) -> Result<()> {
        Err(SuccessionError::RegistryLinkedToken)
    }

    /// Third-party transfers are disabled.
    pub fn transfer_from(
        &mut self,
        _ctx: &mut CallContext,
        _from: Address,
        _to: Address,
        _id: TokenId,
    ) -> Result<()> {
        Err(SuccessionError::RegistryLinkedToken)
    }

    /// Approvals are disabled; there is nothing an approved spender could do.
    pub fn approve(&mut self, _ctx: &mut CallContext, _spender: Address, _id: TokenId) -> Result<()> {
        Err(SuccessionError::RegistryLinkedToken)
    }

    pub fn set_approval_for_all(
        &mut self,
        _ctx: &mut CallContext,
        _operator: Address,
        _approved: bool,
    ) -> Result<()> {
        Err(SuccessionError::RegistryLinkedToken)
    }

    /// Move `token_id` from `from` to `to` on behalf of an authorized registry
    /// (the caller).
    ///
    /// The returned scope keeps the token locked; the environment notifies
    /// the recipient before dropping it, so a recipient cannot re-enter any
    /// token mutation mid-transfer.
    pub fn transfer_by_registry(
        &mut self,
        ctx: &mut CallContext,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<LockScope> {
        let scope = self.lock.enter()?;
        let operator = ctx.caller();

        let owner = self
            .owners
            .get(&token_id)
            .copied()
            .ok_or(SuccessionError::TokenNotFound(token_id))?;
        if owner != from {
            return Err(SuccessionError::NotAuthorized(format!(
                "{from} does not own token {token_id}"
            )));
        }
        if !self.is_authorized_registry(owner, operator) {
            return Err(SuccessionError::NotAuthorized(format!(
                "{operator} is not an authorized registry for {owner}"
            )));
        }
        if to.is_zero() {
            return Err(SuccessionError::ZeroAddress);
        }

        let current = self.balance_of(to);
        if current >= MAX_INHERITED_TOKENS {
            return Err(SuccessionError::InheritedTokenLimitExceeded {
                current,
                max: MAX_INHERITED_TOKENS,
            });
        }

        self.owned_tokens
            .get_mut(&from)
            .ok_or(SuccessionError::TokenNotFound(token_id))?
            .remove(token_id)?;
        self.owned_tokens.entry(to).or_default().insert(token_id);
        self.owners.insert(token_id, to);

        ctx.emit(Event::Transferred {
            operator,
            from,
            to,
            token_id,
        });
        Ok(scope)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// The address currently in control of `original_holder`'s resources.
    ///
    /// Zero if the holder never minted or the original token has no owner.
    /// Always computed from live ownership.
    pub fn get_current_controller(&self, original_holder: Address) -> Address {
        self.original_token_id
            .get(&original_holder)
            .and_then(|id| self.owners.get(id))
            .copied()
            .unwrap_or(Address::ZERO)
    }

    pub fn has_minted(&self, holder: Address) -> bool {
        self.original_token_id.contains_key(&holder)
    }

    pub fn original_token_id(&self, holder: Address) -> Option<TokenId> {
        self.original_token_id.get(&holder).copied()
    }

    /// The holder who minted `token_id`, if it is an original token.
    pub fn original_holder_of(&self, token_id: TokenId) -> Option<Address> {
        self.original_holder_of.get(&token_id).copied()
    }

    pub fn is_authorized_registry(&self, holder: Address, registry: Address) -> bool {
        self.authorized_registries
            .get(&holder)
            .is_some_and(|set| set.contains(&registry))
    }

    pub fn is_trusted_factory(&self, factory: Address) -> bool {
        self.trusted_factories.contains(&factory)
    }

    pub fn owner_of(&self, token_id: TokenId) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    pub fn balance_of(&self, holder: Address) -> usize {
        self.owned_tokens.get(&holder).map_or(0, OwnedTokenSet::len)
    }

    /// Token ids `holder` currently owns, in set order.
    pub fn owned_tokens(&self, holder: Address) -> Vec<TokenId> {
        self.owned_tokens
            .get(&holder)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    /// Number of live tokens.
    pub fn total_supply(&self) -> usize {
        self.owners.len()
    }

    /// The id the next mint will assign.
    pub fn next_token_id(&self) -> TokenId {
        TokenId(self.next_id)
    }

    /// Cross-check the ownership indexes. Returns one line per violation.
    pub fn consistency_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (id, owner) in &self.owners {
            let listed = self
                .owned_tokens
                .get(owner)
                .is_some_and(|set| set.contains(*id));
            if !listed {
                violations.push(format!("token {id} owned by {owner} missing from its set"));
            }
        }
        for (holder, set) in &self.owned_tokens {
            for id in set.iter() {
                if self.owners.get(&id) != Some(holder) {
                    violations.push(format!("token {id} listed for {holder} but not owned"));
                }
            }
        }
        for (holder, id) in &self.original_token_id {
            if id.0 == 0 {
                violations.push(format!("{holder} has the zero token id"));
            }
            if self.original_holder_of.get(id) != Some(holder) {
                violations.push(format!("reverse index broken for {id}"));
            }
        }
        violations
    }
}
