//! AgenticSuccession — succession-controlled authority for agent-owned resources.
//!
//! Provides a transferable authority token per original holder, an
//! inactivity-based succession registry that hands the token to a designated
//! successor, and a read-only link any resource can embed to recognise its
//! current controller. Calls run through an atomic, totally ordered
//! execution environment that rejects reentrant calls.

pub mod chain;
pub mod context;
pub mod crypto;
pub mod error;
pub mod events;
pub mod factory;
pub mod guard;
pub mod identity;
pub mod link;
pub mod registry;
pub mod resource;
pub mod storage;
pub mod time;
pub mod token;
pub mod tx;

// Re-export primary types
pub use chain::{Call, CallOutcome, Chain, ChainState, TokenReceiver};
pub use context::CallContext;
pub use error::{ErrorKind, Result, SuccessionError};
pub use events::{Event, EventRecord};
pub use identity::{Address, Signer};
pub use link::{AuthorityLink, ControllerLookup, Linked};
pub use registry::{
    RegistryState, SuccessionPlan, SuccessionPolicy, SuccessionRegistry, SuccessionReport,
    WaitPeriod,
};
pub use resource::ControlledResource;
pub use token::{AuthorityToken, OwnedTokenSet, TokenId, MAX_INHERITED_TOKENS};
pub use tx::SignedCall;
