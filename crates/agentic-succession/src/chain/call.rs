//! Calls accepted by the chain and their outcomes.

use serde::{Deserialize, Serialize};

use crate::identity::Address;
use crate::registry::{SuccessionReport, WaitPeriod};
use crate::token::TokenId;

/// One state-mutating operation, addressed to an instance.
///
/// The caller is not part of the call; it comes from the signature on a
/// [`crate::SignedCall`] or from the instance making a nested call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    // ── Authority token ──────────────────────────────────────────────────
    Mint,
    Burn {
        token_id: TokenId,
    },
    Transfer {
        to: Address,
        token_id: TokenId,
    },
    TransferFrom {
        from: Address,
        to: Address,
        token_id: TokenId,
    },
    Approve {
        spender: Address,
        token_id: TokenId,
    },
    SetApprovalForAll {
        operator: Address,
        approved: bool,
    },
    SetTrustedFactory {
        factory: Address,
        trusted: bool,
    },
    AuthorizeRegistry {
        holder: Address,
        registry: Address,
    },

    // ── Factories ────────────────────────────────────────────────────────
    CreateFactory,
    DeployRegistry {
        factory: Address,
    },
    DeployResource {
        factory: Address,
    },

    // ── Succession registry ──────────────────────────────────────────────
    Configure {
        registry: Address,
        successor: Address,
        wait_period: WaitPeriod,
    },
    UpdateSuccessor {
        registry: Address,
        successor: Address,
    },
    CheckIn {
        registry: Address,
    },
    ExecuteSuccession {
        registry: Address,
    },

    // ── Linked resources ─────────────────────────────────────────────────
    SetEntry {
        resource: Address,
        key: String,
        value: String,
    },
}

impl Call {
    /// Short operation name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Burn { .. } => "burn",
            Self::Transfer { .. } => "transfer",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Approve { .. } => "approve",
            Self::SetApprovalForAll { .. } => "set_approval_for_all",
            Self::SetTrustedFactory { .. } => "set_trusted_factory",
            Self::AuthorizeRegistry { .. } => "authorize_registry",
            Self::CreateFactory => "create_factory",
            Self::DeployRegistry { .. } => "deploy_registry",
            Self::DeployResource { .. } => "deploy_resource",
            Self::Configure { .. } => "configure",
            Self::UpdateSuccessor { .. } => "update_successor",
            Self::CheckIn { .. } => "check_in",
            Self::ExecuteSuccession { .. } => "execute_succession",
            Self::SetEntry { .. } => "set_entry",
        }
    }
}

/// What a successful call produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum CallOutcome {
    Done,
    Minted(TokenId),
    Deployed(Address),
    Succession(SuccessionReport),
}
