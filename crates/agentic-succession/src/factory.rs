//! Bootstrap factory: per-holder registry and resource deployment records.
//!
//! The factory decides addresses and keeps the `holder → registry` map the
//! authority token consults when authorizing a registry. The chain performs
//! the actual instantiation, initialization and authorization in the same
//! atomic call (see [`crate::Chain`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::CallContext;
use crate::error::{Result, SuccessionError};
use crate::events::Event;
use crate::identity::Address;
use crate::token::AuthorityToken;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryFactory {
    address: Address,
    creator: Address,
    registries: BTreeMap<Address, Address>,
    resources: BTreeMap<Address, Vec<Address>>,
}

impl RegistryFactory {
    pub fn new(address: Address, creator: Address) -> Self {
        Self {
            address,
            creator,
            registries: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn creator(&self) -> Address {
        self.creator
    }

    /// The registry this factory deployed for `holder`.
    pub fn registry_of(&self, holder: Address) -> Option<Address> {
        self.registries.get(&holder).copied()
    }

    pub fn resources_of(&self, holder: Address) -> &[Address] {
        self.resources.get(&holder).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deterministic address of `holder`'s registry.
    pub fn registry_address_for(&self, holder: Address) -> Address {
        Address::derive(
            "agentic-succession/registry",
            &[&self.address.as_bytes()[..], &holder.as_bytes()[..]],
        )
    }

    /// Deterministic address of `holder`'s next resource.
    pub fn resource_address_for(&self, holder: Address) -> Address {
        let index = self.resources_of(holder).len() as u64;
        Address::derive(
            "agentic-succession/resource",
            &[
                &self.address.as_bytes()[..],
                &holder.as_bytes()[..],
                &index.to_be_bytes()[..],
            ],
        )
    }

    /// Fail unless `holder` minted and their original token still has an owner.
    pub fn ensure_token_holder(&self, token: &AuthorityToken, holder: Address) -> Result<()> {
        if !token.has_minted(holder) || token.get_current_controller(holder).is_zero() {
            return Err(SuccessionError::NoAuthorityToken(holder));
        }
        Ok(())
    }

    /// Record a registry for `holder`. One per holder.
    pub fn record_registry(&mut self, ctx: &mut CallContext, holder: Address) -> Result<Address> {
        if self.registries.contains_key(&holder) {
            return Err(SuccessionError::AlreadyDeployed(holder));
        }
        let registry = self.registry_address_for(holder);
        self.registries.insert(holder, registry);

        log::info!(
            "factory {} deployed registry {} for {}",
            self.address.short(),
            registry.short(),
            holder.short()
        );
        ctx.emit(Event::RegistryDeployed {
            factory: self.address,
            holder,
            registry,
        });
        Ok(registry)
    }

    /// Record a new resource for `holder`.
    pub fn record_resource(&mut self, ctx: &mut CallContext, holder: Address) -> Address {
        let resource = self.resource_address_for(holder);
        self.resources.entry(holder).or_default().push(resource);

        log::info!(
            "factory {} deployed resource {} for {}",
            self.address.short(),
            resource.short(),
            holder.short()
        );
        ctx.emit(Event::ResourceDeployed {
            factory: self.address,
            holder,
            resource,
        });
        resource
    }
}
