//! Per-call execution context: who is calling, when, and what it emitted.

use crate::events::Event;
use crate::identity::Address;

/// Context threaded through every state-mutating operation.
///
/// Events are buffered here and only reach the chain's log when the whole
/// call succeeds.
#[derive(Debug, Clone)]
pub struct CallContext {
    caller: Address,
    timestamp: u64,
    events: Vec<Event>,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self {
            caller,
            timestamp,
            events: Vec::new(),
        }
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Unix seconds at which the call executes.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Context for a call made by an instance on behalf of this call, e.g. a
    /// registry moving tokens. Same timestamp, new caller, empty buffer.
    pub fn nested(&self, caller: Address) -> Self {
        Self::new(caller, self.timestamp)
    }

    /// Append the events of a completed nested call.
    pub fn absorb(&mut self, nested: CallContext) {
        self.events.extend(nested.events);
    }
}
