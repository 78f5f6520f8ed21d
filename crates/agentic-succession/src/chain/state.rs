//! Persistent chain state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SuccessionError};
use crate::events::EventRecord;
use crate::factory::RegistryFactory;
use crate::identity::Address;
use crate::registry::SuccessionRegistry;
use crate::resource::ControlledResource;
use crate::token::{AuthorityToken, RegistryDirectory};

/// Every deployed instance. Snapshotted before each call and restored when
/// the call fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instances {
    pub(crate) token: AuthorityToken,
    pub(crate) factories: BTreeMap<Address, RegistryFactory>,
    pub(crate) registries: BTreeMap<Address, SuccessionRegistry>,
    pub(crate) resources: BTreeMap<Address, ControlledResource>,
    pub(crate) factory_count: u64,
}

impl Instances {
    pub(crate) fn new(token: AuthorityToken) -> Self {
        Self {
            token,
            factories: BTreeMap::new(),
            registries: BTreeMap::new(),
            resources: BTreeMap::new(),
            factory_count: 0,
        }
    }

    pub(crate) fn registry(&self, address: Address) -> Result<&SuccessionRegistry> {
        self.registries
            .get(&address)
            .ok_or(SuccessionError::UnknownInstance(address))
    }

    pub(crate) fn registry_mut(&mut self, address: Address) -> Result<&mut SuccessionRegistry> {
        self.registries
            .get_mut(&address)
            .ok_or(SuccessionError::UnknownInstance(address))
    }
}

/// Read view over factory and registry records for registry authorization.
pub struct StateDirectory<'a> {
    factories: &'a BTreeMap<Address, RegistryFactory>,
    registries: &'a BTreeMap<Address, SuccessionRegistry>,
}

impl<'a> StateDirectory<'a> {
    pub fn new(
        factories: &'a BTreeMap<Address, RegistryFactory>,
        registries: &'a BTreeMap<Address, SuccessionRegistry>,
    ) -> Self {
        Self {
            factories,
            registries,
        }
    }
}

impl RegistryDirectory for StateDirectory<'_> {
    fn registry_tracked_by(&self, factory: Address, holder: Address) -> Option<Address> {
        self.factories.get(&factory)?.registry_of(holder)
    }

    fn registry_owner(&self, registry: Address) -> Option<Address> {
        self.registries
            .get(&registry)
            .filter(|r| r.is_initialized())
            .map(SuccessionRegistry::owner)
    }
}

/// Everything a chain needs to resume: instances, clock, log and nonces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainState {
    pub governance: Address,
    /// Current chain time, Unix seconds.
    pub now: u64,
    pub instances: Instances,
    pub events: Vec<EventRecord>,
    /// Next expected nonce per signer.
    pub nonces: BTreeMap<Address, u64>,
}

impl ChainState {
    /// A fresh state with the authority token deployed and no other instance.
    pub fn new(governance: Address, now: u64) -> Self {
        let token_address = Address::derive(
            "agentic-succession/token",
            &[&governance.as_bytes()[..]],
        );
        Self {
            governance,
            now,
            instances: Instances::new(AuthorityToken::new(token_address, governance)),
            events: Vec::new(),
            nonces: BTreeMap::new(),
        }
    }
}
