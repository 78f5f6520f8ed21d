//! Authority link, the "who controls me" capability resources embed.
//!
//! A link remembers one authority token instance and one original holder,
//! fixed at initialization, and answers every authority question by asking
//! the token. It never caches an answer.

use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::{Result, SuccessionError};
use crate::events::Event;
use crate::identity::Address;
use crate::token::AuthorityToken;

/// Anything that can resolve the current controller of an original holder.
///
/// [`AuthorityToken`] is the production implementation. Links only require
/// this trait so a resource can be checked against any lookup (a different
/// token instance, a test double).
pub trait ControllerLookup {
    /// Address of the token instance answering the lookup.
    fn token_address(&self) -> Address;

    /// Current controller of `original_holder`'s resources, or zero.
    fn current_controller_of(&self, original_holder: Address) -> Address;
}

impl ControllerLookup for AuthorityToken {
    fn token_address(&self) -> Address {
        self.address()
    }

    fn current_controller_of(&self, original_holder: Address) -> Address {
        self.get_current_controller(original_holder)
    }
}

/// Binding between a resource and the authority token that governs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityLink {
    authority_token: Address,
    original_holder: Address,
    initialized: bool,
}

impl AuthorityLink {
    /// An uninitialized link. Every query answers zero until `initialize`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the link. Callable exactly once.
    pub fn initialize(
        &mut self,
        ctx: &mut CallContext,
        link: Address,
        authority_token: Address,
        original_holder: Address,
    ) -> Result<()> {
        if self.initialized {
            return Err(SuccessionError::AlreadyInitialized);
        }
        if authority_token.is_zero() {
            return Err(SuccessionError::ZeroControllerNFT);
        }
        if original_holder.is_zero() {
            return Err(SuccessionError::ZeroOriginalHolder);
        }

        self.initialized = true;
        self.authority_token = authority_token;
        self.original_holder = original_holder;

        ctx.emit(Event::LinkInitialized {
            link,
            authority_token,
            original_holder,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn authority_token(&self) -> Address {
        self.authority_token
    }

    pub fn original_holder(&self) -> Address {
        self.original_holder
    }

    /// The controller according to `lookup`.
    ///
    /// Zero when the link is unbound or `lookup` is not the bound token.
    pub fn current_controller(&self, lookup: &dyn ControllerLookup) -> Address {
        if !self.initialized || lookup.token_address() != self.authority_token {
            return Address::ZERO;
        }
        lookup.current_controller_of(self.original_holder)
    }

    /// True once control has moved away from the original holder.
    pub fn has_succession_occurred(&self, lookup: &dyn ControllerLookup) -> bool {
        let controller = self.current_controller(lookup);
        !controller.is_zero() && controller != self.original_holder
    }

    /// Guard for "only current controller" operations.
    pub fn ensure_controller(&self, lookup: &dyn ControllerLookup, caller: Address) -> Result<()> {
        let controller = self.current_controller(lookup);
        if controller.is_zero() || controller != caller {
            return Err(SuccessionError::NotController { caller, controller });
        }
        Ok(())
    }
}

/// Implemented by every resource that embeds an [`AuthorityLink`].
pub trait Linked {
    fn link(&self) -> &AuthorityLink;

    fn current_controller(&self, lookup: &dyn ControllerLookup) -> Address {
        self.link().current_controller(lookup)
    }

    fn has_succession_occurred(&self, lookup: &dyn ControllerLookup) -> bool {
        self.link().has_succession_occurred(lookup)
    }

    fn ensure_controller(&self, lookup: &dyn ControllerLookup, caller: Address) -> Result<()> {
        self.link().ensure_controller(lookup, caller)
    }
}
