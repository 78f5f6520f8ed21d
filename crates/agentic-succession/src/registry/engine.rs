//! The succession registry instance.

use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::{Result, SuccessionError};
use crate::events::Event;
use crate::guard::{LockScope, ReentrancyLock};
use crate::identity::Address;
use crate::token::{AuthorityToken, TokenId, MAX_INHERITED_TOKENS};

use super::policy::{InactivityPolicy, SuccessionPolicy, WaitPeriod};

/// Where a registry is in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RegistryState {
    Uninitialized,
    Unconfigured,
    /// Clock running; the successor may execute from `claimable_at`.
    Active { claimable_at: u64 },
    Claimable,
}

/// What one execution will move, computed before any token changes hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessionPlan {
    pub from: Address,
    pub to: Address,
    /// Tokens to move, in order. The original token comes first when the
    /// owner still holds it.
    pub transfers: Vec<TokenId>,
    /// Tokens left with the owner for a later retry.
    pub skipped: Vec<TokenId>,
    /// Tokens the successor held before execution.
    pub successor_held: usize,
}

/// Result of a successful execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessionReport {
    pub from: Address,
    pub to: Address,
    pub transferred: Vec<TokenId>,
    pub skipped: Vec<TokenId>,
}

impl SuccessionReport {
    /// True when some tokens did not fit and remain with the owner.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// One registry per original holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessionRegistry {
    address: Address,
    owner: Address,
    authority_token: Address,
    initialized: bool,
    policy: Option<InactivityPolicy>,
    #[serde(skip)]
    lock: ReentrancyLock,
}

impl SuccessionRegistry {
    /// An uninitialized registry at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            owner: Address::ZERO,
            authority_token: Address::ZERO,
            initialized: false,
            policy: None,
            lock: ReentrancyLock::new(),
        }
    }

    /// One-time setup binding the registry to its owner and token.
    pub fn initialize(
        &mut self,
        ctx: &mut CallContext,
        owner: Address,
        authority_token: Address,
    ) -> Result<()> {
        if self.initialized {
            return Err(SuccessionError::AlreadyInitialized);
        }
        if owner.is_zero() || authority_token.is_zero() {
            return Err(SuccessionError::ZeroAddress);
        }
        self.initialized = true;
        self.owner = owner;
        self.authority_token = authority_token;

        ctx.emit(Event::RegistryInitialized {
            registry: self.address,
            owner,
            authority_token,
        });
        Ok(())
    }

    // ── Owner operations ─────────────────────────────────────────────────

    /// Set the policy. Once per registry.
    pub fn configure(
        &mut self,
        ctx: &mut CallContext,
        successor: Address,
        wait_period: WaitPeriod,
    ) -> Result<()> {
        let _scope = self.lock.enter()?;
        self.ensure_owner(ctx.caller())?;
        if self.policy.is_some() {
            return Err(SuccessionError::AlreadyConfigured);
        }
        self.validate_successor(successor)?;

        self.policy = Some(InactivityPolicy::new(
            successor,
            wait_period,
            ctx.timestamp(),
        ));
        log::debug!(
            "registry {} configured: successor {}, {} wait",
            self.address.short(),
            successor.short(),
            wait_period
        );
        ctx.emit(Event::PolicyConfigured {
            registry: self.address,
            successor,
            wait_period,
        });
        Ok(())
    }

    /// Name a new successor. Counts as owner activity.
    pub fn update_successor(&mut self, ctx: &mut CallContext, successor: Address) -> Result<()> {
        let _scope = self.lock.enter()?;
        self.ensure_owner(ctx.caller())?;
        self.validate_successor(successor)?;
        let now = ctx.timestamp();
        let policy = self.policy.as_mut().ok_or(SuccessionError::NotConfigured)?;

        let previous = policy.successor;
        policy.successor = successor;
        policy.touch(now);

        ctx.emit(Event::SuccessorUpdated {
            registry: self.address,
            previous,
            successor,
        });
        Ok(())
    }

    /// Reset the inactivity clock.
    pub fn check_in(&mut self, ctx: &mut CallContext) -> Result<()> {
        let _scope = self.lock.enter()?;
        self.ensure_owner(ctx.caller())?;
        let now = ctx.timestamp();
        let policy = self.policy.as_mut().ok_or(SuccessionError::NotConfigured)?;

        let next_allowed_at = policy.next_check_in_at();
        if now < next_allowed_at {
            return Err(SuccessionError::CheckInTooSoon { next_allowed_at });
        }
        policy.touch(now);

        ctx.emit(Event::CheckedIn {
            registry: self.address,
            timestamp: now,
        });
        Ok(())
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Hold the registry for an execution driven from outside.
    pub fn begin_execution(&self) -> Result<LockScope> {
        self.lock.enter()
    }

    /// Validate an execution attempt and decide what it moves.
    ///
    /// Every precondition is evaluated against live state: policy, caller,
    /// clock, the owner's holdings and the successor's free capacity.
    pub fn plan_succession(
        &self,
        caller: Address,
        now: u64,
        token: &AuthorityToken,
    ) -> Result<SuccessionPlan> {
        let policy = self.policy.as_ref().ok_or(SuccessionError::NotConfigured)?;
        policy.check_conditions(caller, now)?;

        let from = self.owner;
        let to = policy.successor;

        let mut pending = token.owned_tokens(from);
        if pending.is_empty() {
            return Err(SuccessionError::NoNFTsToTransfer);
        }
        let original = token.original_token_id(from);
        pending.sort_by_key(|id| (Some(*id) != original, *id));

        let successor_held = token.balance_of(to);
        let available = MAX_INHERITED_TOKENS.saturating_sub(successor_held);
        if available == 0 {
            return Err(SuccessionError::InsufficientSpace {
                current: successor_held,
                incoming: pending.len(),
                available,
            });
        }

        let skipped = pending.split_off(available.min(pending.len()));
        Ok(SuccessionPlan {
            from,
            to,
            transfers: pending,
            skipped,
            successor_held,
        })
    }

    /// Emit the outcome of an executed plan.
    pub fn finish_succession(&self, ctx: &mut CallContext, plan: SuccessionPlan) -> SuccessionReport {
        let count = plan.transfers.len();
        log::info!(
            "succession {} -> {}: {count} token(s) transferred",
            plan.from.short(),
            plan.to.short()
        );
        ctx.emit(Event::SuccessionExecuted {
            from: plan.from,
            to: plan.to,
            count,
        });
        if !plan.skipped.is_empty() {
            log::warn!(
                "partial succession {} -> {}: {} skipped, successor out of capacity",
                plan.from.short(),
                plan.to.short(),
                plan.skipped.len()
            );
            ctx.emit(Event::PartialTransfer {
                from: plan.from,
                to: plan.to,
                transferred: count,
                skipped: plan.skipped.len(),
            });
        }
        SuccessionReport {
            from: plan.from,
            to: plan.to,
            transferred: plan.transfers,
            skipped: plan.skipped,
        }
    }

    /// Run a complete execution against `token` directly.
    ///
    /// [`crate::Chain`] drives the same three steps itself so it can notify
    /// recipients between transfers.
    pub fn execute_succession(
        &self,
        ctx: &mut CallContext,
        token: &mut AuthorityToken,
    ) -> Result<SuccessionReport> {
        let _scope = self.begin_execution()?;
        let plan = self.plan_succession(ctx.caller(), ctx.timestamp(), token)?;

        let mut nested = ctx.nested(self.address);
        for id in &plan.transfers {
            let _transfer = token.transfer_by_registry(&mut nested, plan.from, plan.to, *id)?;
        }
        ctx.absorb(nested);

        Ok(self.finish_succession(ctx, plan))
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn authority_token(&self) -> Address {
        self.authority_token
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn policy(&self) -> Option<&InactivityPolicy> {
        self.policy.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.policy.is_some()
    }

    pub fn state(&self, now: u64) -> RegistryState {
        if !self.initialized {
            return RegistryState::Uninitialized;
        }
        match &self.policy {
            None => RegistryState::Unconfigured,
            Some(policy) if now >= policy.claimable_at() => RegistryState::Claimable,
            Some(policy) => RegistryState::Active {
                claimable_at: policy.claimable_at(),
            },
        }
    }

    pub fn claimable_at(&self) -> Option<u64> {
        self.policy.as_ref().map(InactivityPolicy::claimable_at)
    }

    /// Seconds until the successor may execute; zero once claimable.
    pub fn time_remaining(&self, now: u64) -> Option<u64> {
        self.claimable_at().map(|at| at.saturating_sub(now))
    }

    /// Whether `caller` passes the policy check at `now`. Does not look at
    /// token holdings or capacity.
    pub fn can_execute(&self, caller: Address, now: u64) -> bool {
        self.policy
            .as_ref()
            .is_some_and(|p| p.check_conditions(caller, now).is_ok())
    }

    fn ensure_owner(&self, caller: Address) -> Result<()> {
        if !self.initialized {
            return Err(SuccessionError::NotInitialized);
        }
        if caller != self.owner {
            return Err(SuccessionError::Unauthorized(caller));
        }
        Ok(())
    }

    fn validate_successor(&self, successor: Address) -> Result<()> {
        if successor.is_zero() {
            return Err(SuccessionError::ZeroAddress);
        }
        if successor == self.owner {
            return Err(SuccessionError::NotAuthorized(
                "owner cannot be their own successor".into(),
            ));
        }
        Ok(())
    }
}
