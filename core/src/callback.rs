//! Pending callbacks and the identifiers that key them.

use std::collections::HashMap;
use std::fmt;

use log::warn;
use serde_json::Value;

use crate::config::{BridgeConfig, SEED_RANGE};

/// Handler invoked with the payload of a completion.
pub type Handler = Box<dyn FnMut(Value)>;

/// The success/failure handler pair registered for one invocation.
///
/// Either side may be absent; a completion routed to a missing handler is
/// dropped.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) success: Option<Handler>,
    pub(crate) failure: Option<Handler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, handler: impl FnMut(Value) + 'static) -> Self {
        self.success = Some(Box::new(handler));
        self
    }

    pub fn on_failure(mut self, handler: impl FnMut(Value) + 'static) -> Self {
        self.failure = Some(Box::new(handler));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("success", &self.success.is_some())
            .field("failure", &self.failure.is_some())
            .finish()
    }
}

/// Produces `{class}_{method}_{counter}` identifiers.
#[derive(Debug, Clone, Copy)]
pub struct CallbackIds {
    next: u64,
}

impl CallbackIds {
    pub fn new(config: &BridgeConfig) -> Self {
        let next = config.initial_counter.unwrap_or_else(random_seed);
        Self { next }
    }

    pub fn next_id(&mut self, class_name: &str, method_name: &str) -> String {
        let id = format!("{class_name}_{method_name}_{}", self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

fn random_seed() -> u64 {
    match getrandom::u32() {
        Ok(n) => u64::from(n) % SEED_RANGE,
        Err(e) => {
            warn!("no random seed available, callback ids start at 0: {e}");
            0
        }
    }
}

/// Identifier → handler pair for every invocation still awaiting a response.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    entries: HashMap<String, Callbacks>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String, callbacks: Callbacks) {
        self.entries.insert(id, callbacks);
    }

    pub fn remove(&mut self, id: &str) -> Option<Callbacks> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
