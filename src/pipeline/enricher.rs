//! Enrichment stage: threat intelligence agent
//!
//! Resolves alerted patterns against a static threat context map seeded at
//! startup (configuration data, never mutated afterwards) and forwards the
//! enriched threat to the response orchestration capability.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use crate::agent::{AgentContext, Behavior, Flow};
use crate::protocol::{capabilities, conversations, prefixes, Envelope, Performative};

/// Threat intelligence enrichment behavior.
pub struct EnricherBehavior {
    /// Pattern name -> origin/actor-group/severity context string.
    threat_db: HashMap<String, String>,
}

impl EnricherBehavior {
    pub fn new(threat_db: HashMap<String, String>) -> Self {
        Self { threat_db }
    }

    /// Resolve an `ALERTA:<pattern>` payload against the threat database.
    ///
    /// Known pattern: `<pattern>|<context>|PREDICCION:Escalada a compromiso
    /// total`. Unknown pattern: `<pattern>|ORIGEN:Desconocido|SEVERIDAD:BAJA`.
    pub fn enrich(&self, alert: &str) -> String {
        let pattern = alert.strip_prefix(prefixes::ALERT).unwrap_or(alert);
        match self.threat_db.get(pattern) {
            Some(context) => {
                format!("{pattern}|{context}|PREDICCION:Escalada a compromiso total")
            }
            None => format!("{pattern}|ORIGEN:Desconocido|SEVERIDAD:BAJA"),
        }
    }
}

#[async_trait]
impl Behavior for EnricherBehavior {
    fn advertisements(&self) -> Vec<(String, String)> {
        vec![(
            capabilities::THREAT_INTELLIGENCE.to_string(),
            "inteligencia-amenazas".to_string(),
        )]
    }

    async fn on_start(&mut self, ctx: &AgentContext) {
        info!(
            agent = %ctx.id(),
            known_patterns = self.threat_db.len(),
            "threat database loaded"
        );
    }

    async fn on_envelope(&mut self, ctx: &AgentContext, envelope: Envelope) -> Flow {
        info!(
            agent = %ctx.id(),
            alert = envelope.payload(),
            "alert received"
        );

        let enriched = self.enrich(envelope.payload());
        info!(agent = %ctx.id(), context = %enriched, "alert enriched");

        ctx.forward_first(
            capabilities::RESPONSE_ORCHESTRATION,
            Performative::Inform,
            conversations::INCIDENT_RESPONSE,
            format!("{}{}", prefixes::ENRICHED_THREAT, enriched),
        );
        Flow::Continue
    }
}
