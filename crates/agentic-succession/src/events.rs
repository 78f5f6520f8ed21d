//! Events emitted by tokens, registries, links and factories.

use serde::{Deserialize, Serialize};

use crate::identity::Address;
use crate::registry::WaitPeriod;
use crate::token::TokenId;

/// Observable state changes. Appended to the chain log in call order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    // ── Authority token ──────────────────────────────────────────────────
    Minted {
        holder: Address,
        token_id: TokenId,
    },
    Burned {
        holder: Address,
        token_id: TokenId,
    },
    Transferred {
        operator: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    },
    RegistryAuthorized {
        holder: Address,
        registry: Address,
        authorized: bool,
    },
    TrustedFactoryUpdated {
        factory: Address,
        trusted: bool,
    },

    // ── Succession registry ──────────────────────────────────────────────
    RegistryInitialized {
        registry: Address,
        owner: Address,
        authority_token: Address,
    },
    PolicyConfigured {
        registry: Address,
        successor: Address,
        wait_period: WaitPeriod,
    },
    SuccessorUpdated {
        registry: Address,
        previous: Address,
        successor: Address,
    },
    CheckedIn {
        registry: Address,
        timestamp: u64,
    },
    SuccessionExecuted {
        from: Address,
        to: Address,
        count: usize,
    },
    PartialTransfer {
        from: Address,
        to: Address,
        transferred: usize,
        skipped: usize,
    },

    // ── Links, resources and factories ───────────────────────────────────
    LinkInitialized {
        link: Address,
        authority_token: Address,
        original_holder: Address,
    },
    ResourceEntrySet {
        resource: Address,
        controller: Address,
        key: String,
    },
    FactoryCreated {
        factory: Address,
        creator: Address,
    },
    RegistryDeployed {
        factory: Address,
        holder: Address,
        registry: Address,
    },
    ResourceDeployed {
        factory: Address,
        holder: Address,
        resource: Address,
    },
}

impl Event {
    /// Return a stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Minted { .. } => "minted",
            Self::Burned { .. } => "burned",
            Self::Transferred { .. } => "transferred",
            Self::RegistryAuthorized { .. } => "registry_authorized",
            Self::TrustedFactoryUpdated { .. } => "trusted_factory_updated",
            Self::RegistryInitialized { .. } => "registry_initialized",
            Self::PolicyConfigured { .. } => "policy_configured",
            Self::SuccessorUpdated { .. } => "successor_updated",
            Self::CheckedIn { .. } => "checked_in",
            Self::SuccessionExecuted { .. } => "succession_executed",
            Self::PartialTransfer { .. } => "partial_transfer",
            Self::LinkInitialized { .. } => "link_initialized",
            Self::ResourceEntrySet { .. } => "resource_entry_set",
            Self::FactoryCreated { .. } => "factory_created",
            Self::RegistryDeployed { .. } => "registry_deployed",
            Self::ResourceDeployed { .. } => "resource_deployed",
        }
    }
}

/// An event as recorded in the chain log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Timestamp of the call that emitted it.
    pub timestamp: u64,
    /// Account that submitted the top-level call.
    pub submitted_by: Address,
    pub event: Event,
}
