//! Authority token: the transferable unit of control over linked resources.
//!
//! The token module provides:
//! - One mint-bound original token per holder
//! - Per-holder owned-token sets with O(1) membership and removal
//! - Transfer mediation: peer-to-peer transfers are disabled, tokens move
//!   only through a succession registry the owner's factory authorized
//! - A per-recipient capacity ceiling that bounds succession cost
//! - `get_current_controller`, the authority query every linked resource uses

pub mod ledger;
pub mod owned;
pub mod types;

pub use ledger::{AuthorityToken, RegistryDirectory};
pub use owned::OwnedTokenSet;
pub use types::{TokenId, MAX_INHERITED_TOKENS};
