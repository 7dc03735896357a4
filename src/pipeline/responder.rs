//! Response stage: orchestrator agent and incident reports
//!
//! Decides a response for each enriched threat by severity keyword, executes
//! the mapped countermeasures as simulated (log-only) side effects, and emits
//! a structured incident report. After a configured number of handled
//! incidents the orchestrator deregisters and terminates its runtime; later
//! messages are dropped and never reported.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::agent::{AgentContext, Behavior, Flow};
use crate::protocol::{capabilities, Envelope};

/// Lifecycle of the response orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    Running,
    Terminating,
    Terminated,
}

/// Simulated countermeasure actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Countermeasure {
    BlockSourceIp,
    IsolateSegment,
    NotifyCsirt,
    AlertAdmin,
}

impl Countermeasure {
    /// Log line for the simulated execution.
    pub fn describe(&self) -> &'static str {
        match self {
            Countermeasure::BlockSourceIp => "Regla de firewall aplicada: IP bloqueada",
            Countermeasure::IsolateSegment => "VLAN aislada: Segmento de red en cuarentena",
            Countermeasure::NotifyCsirt => "Email enviado a equipo CSIRT",
            Countermeasure::AlertAdmin => "Alerta enviada a administrador",
        }
    }
}

/// Structured record of one handled incident.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentReport {
    /// 1-based incident sequence number.
    pub sequence: u32,
    /// Enriched threat payload as received.
    pub threat: String,
    /// Decision text.
    pub decision: String,
    /// Always "MITIGADO" in this design.
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Map an enriched threat to a response decision by severity keyword.
pub fn decide(threat: &str) -> String {
    if threat.contains("CRITICA") {
        "RESPUESTA_AUTOMATICA:Bloquear IP origen + Aislar segmento de red + Notificar CSIRT"
            .to_string()
    } else if threat.contains("ALTA") {
        "RESPUESTA_AUTOMATICA:Bloquear IP origen + Activar monitoreo intensivo".to_string()
    } else if threat.contains("MEDIA") {
        "RESPUESTA_MANUAL:Alertar administrador + Incrementar logging".to_string()
    } else {
        "MONITOREAR:Sin acción automática + Registro en SIEM".to_string()
    }
}

/// Countermeasures triggered by a decision, by substring check on the
/// decision text.
pub fn countermeasures_for(decision: &str) -> Vec<Countermeasure> {
    let mut actions = Vec::new();
    if decision.contains("Bloquear IP") {
        actions.push(Countermeasure::BlockSourceIp);
    }
    if decision.contains("Aislar") {
        actions.push(Countermeasure::IsolateSegment);
    }
    if decision.contains("Notificar") {
        actions.push(Countermeasure::NotifyCsirt);
    }
    if decision.contains("Alertar") {
        actions.push(Countermeasure::AlertAdmin);
    }
    actions
}

/// Response orchestration behavior with bounded termination.
pub struct ResponderBehavior {
    incident_threshold: u32,
    incidents: u32,
    state: ResponderState,
    report_tx: Option<mpsc::UnboundedSender<IncidentReport>>,
}

impl ResponderBehavior {
    pub fn new(incident_threshold: u32) -> Self {
        Self {
            incident_threshold,
            incidents: 0,
            state: ResponderState::Running,
            report_tx: None,
        }
    }

    /// Attach a channel that receives a copy of every incident report, for
    /// observers and tests.
    pub fn with_report_sink(mut self, report_tx: mpsc::UnboundedSender<IncidentReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    pub fn state(&self) -> ResponderState {
        self.state
    }

    pub fn incidents_handled(&self) -> u32 {
        self.incidents
    }
}

#[async_trait]
impl Behavior for ResponderBehavior {
    fn advertisements(&self) -> Vec<(String, String)> {
        vec![(
            capabilities::RESPONSE_ORCHESTRATION.to_string(),
            "orquestador-soc".to_string(),
        )]
    }

    async fn on_envelope(&mut self, ctx: &AgentContext, envelope: Envelope) -> Flow {
        if self.state != ResponderState::Running {
            warn!(agent = %ctx.id(), "threat received while terminating, dropped");
            return Flow::Terminate;
        }

        self.incidents += 1;
        let threat = envelope.payload();
        info!(agent = %ctx.id(), incident = self.incidents, threat, "threat received");

        let decision = decide(threat);
        info!(agent = %ctx.id(), %decision, "response decided");
        for action in countermeasures_for(&decision) {
            info!(agent = %ctx.id(), action = action.describe(), "countermeasure executed");
        }

        let report = IncidentReport {
            sequence: self.incidents,
            threat: threat.to_string(),
            decision,
            status: "MITIGADO".to_string(),
            timestamp: Utc::now(),
        };
        info!(
            agent = %ctx.id(),
            sequence = report.sequence,
            decision = %report.decision,
            status = %report.status,
            "incident report"
        );
        if let Some(report_tx) = &self.report_tx {
            // Observer may have gone away; reporting stays best-effort.
            let _ = report_tx.send(report);
        }

        if self.incidents >= self.incident_threshold {
            self.state = ResponderState::Terminating;
            info!(
                agent = %ctx.id(),
                incidents = self.incidents,
                "incident threshold reached, shutting down"
            );
            return Flow::Terminate;
        }
        Flow::Continue
    }

    async fn on_stop(&mut self, ctx: &AgentContext) {
        self.state = ResponderState::Terminated;
        info!(
            agent = %ctx.id(),
            total_incidents = self.incidents,
            "response orchestrator finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_by_severity_keyword() {
        assert_eq!(
            decide("AMENAZA_ENRIQUECIDA:POSIBLE_DDOS|ORIGEN:Botnet|SEVERIDAD:CRITICA"),
            "RESPUESTA_AUTOMATICA:Bloquear IP origen + Aislar segmento de red + Notificar CSIRT"
        );
        assert_eq!(
            decide("AMENAZA_ENRIQUECIDA:ATAQUE_FUERZA_BRUTA|SEVERIDAD:ALTA"),
            "RESPUESTA_AUTOMATICA:Bloquear IP origen + Activar monitoreo intensivo"
        );
        assert_eq!(
            decide("AMENAZA_ENRIQUECIDA:ATAQUE_RECONOCIMIENTO|SEVERIDAD:MEDIA"),
            "RESPUESTA_MANUAL:Alertar administrador + Incrementar logging"
        );
        assert_eq!(
            decide("AMENAZA_ENRIQUECIDA:ALGO|SEVERIDAD:BAJA"),
            "MONITOREAR:Sin acción automática + Registro en SIEM"
        );
    }

    #[test]
    fn test_countermeasure_mapping() {
        assert_eq!(
            countermeasures_for(
                "RESPUESTA_AUTOMATICA:Bloquear IP origen + Aislar segmento de red + Notificar CSIRT"
            ),
            vec![
                Countermeasure::BlockSourceIp,
                Countermeasure::IsolateSegment,
                Countermeasure::NotifyCsirt,
            ]
        );
        assert_eq!(
            countermeasures_for(
                "RESPUESTA_AUTOMATICA:Bloquear IP origen + Activar monitoreo intensivo"
            ),
            vec![Countermeasure::BlockSourceIp]
        );
        assert_eq!(
            countermeasures_for("RESPUESTA_MANUAL:Alertar administrador + Incrementar logging"),
            vec![Countermeasure::AlertAdmin]
        );
        assert!(countermeasures_for("MONITOREAR:Sin acción automática").is_empty());
    }

    #[test]
    fn test_new_responder_starts_running() {
        let responder = ResponderBehavior::new(3);
        assert_eq!(responder.state(), ResponderState::Running);
        assert_eq!(responder.incidents_handled(), 0);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = IncidentReport {
            sequence: 1,
            threat: "AMENAZA_ENRIQUECIDA:X".to_string(),
            decision: "MONITOREAR:Sin acción automática + Registro en SIEM".to_string(),
            status: "MITIGADO".to_string(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"sequence\":1"));
        assert!(json.contains("MITIGADO"));
    }
}
