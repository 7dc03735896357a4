//! Message envelope and protocol vocabulary for the SOC agent pipeline
//!
//! Payload prefixes, conversation identifiers and capability tags defined here
//! are the cross-agent contract: every stage matches on these literal strings,
//! so they must be used verbatim.

use std::fmt;

use uuid::Uuid;

use crate::agent::AgentId;

/// Capability tags agents advertise in the directory.
pub mod capabilities {
    /// Network sensor (detection stage).
    pub const NETWORK_MONITORING: &str = "monitoreo-red";
    /// Event correlation stage.
    pub const EVENT_CORRELATION: &str = "correlacion-eventos";
    /// Malware analysis service (no holder in the default deployment).
    pub const MALWARE_ANALYSIS: &str = "analisis-malware";
    /// Threat intelligence enrichment stage.
    pub const THREAT_INTELLIGENCE: &str = "threat-intelligence";
    /// Response orchestration stage.
    pub const RESPONSE_ORCHESTRATION: &str = "orquestacion-respuesta";
}

/// Conversation identifiers grouping related envelopes into one exchange.
pub mod conversations {
    /// Detector -> correlator.
    pub const EVENT_DETECTION: &str = "deteccion-eventos";
    /// Correlator -> malware analysis.
    pub const MALWARE_ANALYSIS: &str = "analisis-malware";
    /// Correlator -> threat intelligence.
    pub const THREAT_ALERTS: &str = "amenazas";
    /// Enricher -> response orchestrator.
    pub const INCIDENT_RESPONSE: &str = "respuesta-incidente";
    /// External event source -> detector.
    pub const MANUAL_INJECTION: &str = "inyeccion-manual";
}

/// Payload prefix keywords. Part of the protocol, not incidental formatting.
pub mod prefixes {
    pub const NETWORK_EVENT: &str = "EVENTO_RED:";
    pub const ALERT: &str = "ALERTA:";
    pub const ENRICHED_THREAT: &str = "AMENAZA_ENRIQUECIDA:";
    pub const ANALYZE_FILE: &str = "ANALIZAR_ARCHIVO:";
}

/// Illocutionary type of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Performative {
    /// Statement of fact.
    Inform,
    /// Action ask.
    Request,
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Performative::Inform => write!(f, "INFORM"),
            Performative::Request => write!(f, "REQUEST"),
        }
    }
}

/// Addressed, conversation-tagged message unit exchanged between agents.
///
/// Immutable once constructed; ownership transfers to the receiving mailbox
/// on delivery and to the receiving behavior on dequeue.
///
/// # Examples
/// ```
/// use socmesh::agent::Mailbox;
/// use socmesh::protocol::{conversations, prefixes, Envelope};
///
/// let (sensor, _sensor_mailbox) = Mailbox::channel("sensor-red");
/// let (correlator, mut mailbox) = Mailbox::channel("correlador-eventos");
///
/// let envelope = Envelope::inform(
///     sensor,
///     vec![correlator.clone()],
///     conversations::EVENT_DETECTION,
///     format!("{}Tráfico sospechoso en puerto 4444", prefixes::NETWORK_EVENT),
/// );
/// correlator.deliver(envelope).unwrap();
///
/// let received = mailbox.try_next().unwrap();
/// assert!(received.payload().starts_with(prefixes::NETWORK_EVENT));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Unique message identifier, assigned at construction.
    message_id: Uuid,
    sender: AgentId,
    /// Addressed recipients, in delivery order. Never empty.
    receivers: Vec<AgentId>,
    performative: Performative,
    conversation_id: String,
    payload: String,
}

impl Envelope {
    /// Build an envelope. `receivers` must be non-empty.
    pub fn new(
        sender: AgentId,
        receivers: Vec<AgentId>,
        performative: Performative,
        conversation_id: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        debug_assert!(
            !receivers.is_empty(),
            "envelope requires at least one receiver"
        );
        Self {
            message_id: Uuid::new_v4(),
            sender,
            receivers,
            performative,
            conversation_id: conversation_id.into(),
            payload: payload.into(),
        }
    }

    /// Build an INFORM envelope.
    pub fn inform(
        sender: AgentId,
        receivers: Vec<AgentId>,
        conversation_id: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::new(
            sender,
            receivers,
            Performative::Inform,
            conversation_id,
            payload,
        )
    }

    /// Build a REQUEST envelope.
    pub fn request(
        sender: AgentId,
        receivers: Vec<AgentId>,
        conversation_id: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::new(
            sender,
            receivers,
            Performative::Request,
            conversation_id,
            payload,
        )
    }

    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    pub fn sender(&self) -> &AgentId {
        &self.sender
    }

    pub fn receivers(&self) -> &[AgentId] {
        &self.receivers
    }

    pub fn performative(&self) -> Performative {
        self.performative
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Payload with `prefix` stripped, or `None` if the payload does not
    /// start with it.
    pub fn payload_after(&self, prefix: &str) -> Option<&str> {
        self.payload.strip_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Mailbox;

    fn test_id(name: &str) -> AgentId {
        let (id, mailbox) = Mailbox::channel(name);
        // Detached mailbox keeps the address alive for the test.
        std::mem::forget(mailbox);
        id
    }

    #[test]
    fn test_inform_envelope_construction() {
        let sender = test_id("sensor-red");
        let receiver = test_id("correlador");

        let envelope = Envelope::inform(
            sender.clone(),
            vec![receiver.clone()],
            conversations::EVENT_DETECTION,
            "EVENTO_RED:Actividad anómala en servicio SSH",
        );

        assert_eq!(envelope.sender(), &sender);
        assert_eq!(envelope.receivers(), &[receiver]);
        assert_eq!(envelope.performative(), Performative::Inform);
        assert_eq!(envelope.conversation_id(), "deteccion-eventos");
        assert_eq!(
            envelope.payload(),
            "EVENTO_RED:Actividad anómala en servicio SSH"
        );
    }

    #[test]
    fn test_request_envelope_performative() {
        let envelope = Envelope::request(
            test_id("correlador"),
            vec![test_id("analizador")],
            conversations::MALWARE_ANALYSIS,
            "ANALIZAR_ARCHIVO:sospechoso_POSIBLE_DDOS.exe",
        );

        assert_eq!(envelope.performative(), Performative::Request);
        assert_eq!(envelope.performative().to_string(), "REQUEST");
    }

    #[test]
    fn test_payload_after_prefix() {
        let envelope = Envelope::inform(
            test_id("correlador"),
            vec![test_id("inteligencia")],
            conversations::THREAT_ALERTS,
            "ALERTA:ATAQUE_FUERZA_BRUTA",
        );

        assert_eq!(
            envelope.payload_after(prefixes::ALERT),
            Some("ATAQUE_FUERZA_BRUTA")
        );
        assert_eq!(envelope.payload_after(prefixes::ENRICHED_THREAT), None);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let sender = test_id("a");
        let receiver = test_id("b");
        let first = Envelope::inform(sender.clone(), vec![receiver.clone()], "c", "x");
        let second = Envelope::inform(sender, vec![receiver], "c", "x");

        assert_ne!(first.message_id(), second.message_id());
    }
}
