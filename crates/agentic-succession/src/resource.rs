//! A linked resource: a key/value record writable only by the current
//! controller of its original holder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::Result;
use crate::events::Event;
use crate::identity::Address;
use crate::link::{AuthorityLink, ControllerLookup, Linked};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlledResource {
    address: Address,
    link: AuthorityLink,
    entries: BTreeMap<String, String>,
}

impl ControlledResource {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            link: AuthorityLink::new(),
            entries: BTreeMap::new(),
        }
    }

    /// Bind the resource to `original_holder`'s authority token.
    pub fn initialize(
        &mut self,
        ctx: &mut CallContext,
        authority_token: Address,
        original_holder: Address,
    ) -> Result<()> {
        self.link
            .initialize(ctx, self.address, authority_token, original_holder)
    }

    /// Write an entry. Only the current controller may write.
    pub fn set_entry(
        &mut self,
        ctx: &mut CallContext,
        lookup: &dyn ControllerLookup,
        key: String,
        value: String,
    ) -> Result<()> {
        let controller = ctx.caller();
        self.ensure_controller(lookup, controller)?;

        self.entries.insert(key.clone(), value);
        ctx.emit(Event::ResourceEntrySet {
            resource: self.address,
            controller,
            key,
        });
        Ok(())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl Linked for ControlledResource {
    fn link(&self) -> &AuthorityLink {
        &self.link
    }
}
