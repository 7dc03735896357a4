//! Correlation stage: event history and pattern detection
//!
//! Accumulates every received payload in an append-only local history and
//! classifies the latest entry (see [`crate::pipeline::pattern`]). On a
//! non-NORMAL pattern it fans out two independent best-effort messages: a
//! malware analysis request and a threat intelligence alert. Failure of one
//! send never blocks the other.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::agent::{AgentContext, Behavior, Flow};
use crate::pipeline::pattern::classify_latest;
use crate::protocol::{capabilities, conversations, prefixes, Envelope, Performative};

/// Event correlation behavior.
pub struct CorrelatorBehavior {
    /// Append-only history of received payload strings. Never shared.
    history: Vec<String>,
}

impl CorrelatorBehavior {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }
}

impl Default for CorrelatorBehavior {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Behavior for CorrelatorBehavior {
    fn advertisements(&self) -> Vec<(String, String)> {
        vec![(
            capabilities::EVENT_CORRELATION.to_string(),
            "correlacionador-principal".to_string(),
        )]
    }

    async fn on_envelope(&mut self, ctx: &AgentContext, envelope: Envelope) -> Flow {
        debug!(
            agent = %ctx.id(),
            payload = envelope.payload(),
            "event received for correlation"
        );
        self.history.push(envelope.payload().to_string());

        let pattern = classify_latest(&self.history);
        if pattern.is_normal() {
            return Flow::Continue;
        }
        info!(
            agent = %ctx.id(),
            %pattern,
            history_len = self.history.len(),
            "attack pattern detected"
        );

        ctx.forward_first(
            capabilities::MALWARE_ANALYSIS,
            Performative::Request,
            conversations::MALWARE_ANALYSIS,
            format!("{}sospechoso_{}.exe", prefixes::ANALYZE_FILE, pattern),
        );
        ctx.forward_first(
            capabilities::THREAT_INTELLIGENCE,
            Performative::Inform,
            conversations::THREAT_ALERTS,
            format!("{}{}", prefixes::ALERT, pattern),
        );
        Flow::Continue
    }

    async fn on_stop(&mut self, ctx: &AgentContext) {
        info!(
            agent = %ctx.id(),
            events_correlated = self.history.len(),
            "event correlator finished"
        );
    }
}
