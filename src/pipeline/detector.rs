//! Detection stage: network sensor agent
//!
//! Receives raw event strings from the external injection surface, validates
//! them against a configured allow-list by exact string equality, and
//! forwards recognized events to whatever agent currently advertises the
//! correlation capability. Invalid events and lookup misses are logged and
//! otherwise ignored.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::agent::{AgentContext, Behavior, Flow};
use crate::protocol::{capabilities, conversations, prefixes, Envelope, Performative};

/// Network monitoring behavior (the pipeline's entry stage).
pub struct DetectorBehavior {
    known_events: Vec<String>,
    received: u64,
    forwarded: u64,
}

impl DetectorBehavior {
    pub fn new(known_events: Vec<String>) -> Self {
        Self {
            known_events,
            received: 0,
            forwarded: 0,
        }
    }

    /// Exact-match validation against the allow-list. Case- and
    /// content-sensitive, no fuzzy matching.
    fn is_known_event(&self, event: &str) -> bool {
        self.known_events.iter().any(|known| known == event)
    }
}

#[async_trait]
impl Behavior for DetectorBehavior {
    fn advertisements(&self) -> Vec<(String, String)> {
        vec![(
            capabilities::NETWORK_MONITORING.to_string(),
            "sensor-red-principal".to_string(),
        )]
    }

    async fn on_envelope(&mut self, ctx: &AgentContext, envelope: Envelope) -> Flow {
        self.received += 1;
        let event = envelope.payload();
        info!(
            agent = %ctx.id(),
            from = %envelope.sender(),
            event_no = self.received,
            event,
            "network event received"
        );

        if !self.is_known_event(event) {
            warn!(agent = %ctx.id(), event, "event failed validation, discarded");
            return Flow::Continue;
        }

        let forwarded = ctx.forward_first(
            capabilities::EVENT_CORRELATION,
            Performative::Inform,
            conversations::EVENT_DETECTION,
            format!("{}{}", prefixes::NETWORK_EVENT, event),
        );
        if forwarded {
            self.forwarded += 1;
        }
        Flow::Continue
    }

    async fn on_stop(&mut self, ctx: &AgentContext) {
        info!(
            agent = %ctx.id(),
            received = self.received,
            forwarded = self.forwarded,
            "network sensor finished"
        );
    }
}
