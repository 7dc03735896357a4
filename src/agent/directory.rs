//! Capability directory (yellow pages)
//!
//! Process-wide, mutex-guarded directory mapping capability tags to the
//! agents currently advertising them. Lookups return holders in registration
//! order; a miss is an empty result, never an error. Callers must treat an
//! empty result as "no capability holder available" and degrade gracefully.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::agent::AgentId;

/// A single capability advertisement.
#[derive(Debug, Clone)]
pub struct Advertisement {
    /// The advertising agent.
    pub agent: AgentId,
    /// Capability tag, e.g. `correlacion-eventos`.
    pub capability: String,
    /// Human-readable service name, e.g. `correlacionador-principal`.
    pub service_name: String,
}

/// Thread-safe capability directory shared by every agent runtime.
#[derive(Debug, Clone, Default)]
pub struct CapabilityDirectory {
    // Vec keeps registration order, which is the lookup tie-break rule.
    entries: Arc<Mutex<Vec<Advertisement>>>,
}

impl CapabilityDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `capability` for `agent`. Idempotent per (agent, capability):
    /// re-registering keeps the original entry and position. Returns whether
    /// a new advertisement was added.
    pub fn register(&self, agent: AgentId, capability: &str, service_name: &str) -> bool {
        let mut entries = self.entries.lock().unwrap();
        if entries
            .iter()
            .any(|ad| ad.agent == agent && ad.capability == capability)
        {
            debug!(agent = %agent, capability, "capability already advertised");
            return false;
        }
        info!(agent = %agent, capability, service_name, "capability registered");
        entries.push(Advertisement {
            agent,
            capability: capability.to_string(),
            service_name: service_name.to_string(),
        });
        true
    }

    /// Remove every advertisement held by `agent`. Returns the number of
    /// advertisements removed.
    pub fn deregister(&self, agent: &AgentId) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|ad| &ad.agent != agent);
        let removed = before - entries.len();
        if removed > 0 {
            info!(agent = %agent, removed, "capabilities deregistered");
        }
        removed
    }

    /// All current holders of `capability`, in registration order. Empty when
    /// no agent advertises it.
    pub fn lookup(&self, capability: &str) -> Vec<AgentId> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .filter(|ad| ad.capability == capability)
            .map(|ad| ad.agent.clone())
            .collect()
    }

    /// First holder of `capability` in registration order, if any.
    pub fn lookup_first(&self, capability: &str) -> Option<AgentId> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .find(|ad| ad.capability == capability)
            .map(|ad| ad.agent.clone())
    }

    /// Capability tags currently advertised by `agent`.
    pub fn capabilities_of(&self, agent: &AgentId) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .filter(|ad| &ad.agent == agent)
            .map(|ad| ad.capability.clone())
            .collect()
    }

    /// Total number of live advertisements.
    pub fn advertisement_count(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.len()
    }
}
