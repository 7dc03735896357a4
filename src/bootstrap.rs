//! Bootstrap: wiring the SOC pipeline
//!
//! Creates the shared capability directory, spawns the four stage agents and
//! exposes the external surfaces: event injection, the incident report
//! stream, the read-only directory, and shutdown.

use tokio::sync::mpsc;
use tracing::info;

use crate::agent::{
    AgentHandle, AgentId, AgentRuntime, CapabilityDirectory, DeliveryError, Mailbox,
};
use crate::config::SocConfig;
use crate::pipeline::{
    CorrelatorBehavior, DetectorBehavior, EnricherBehavior, IncidentReport, ResponderBehavior,
};
use crate::protocol::{conversations, Envelope};

/// Event sequence for the demo scenario: one NORMAL warm-up event, then one
/// incident of each severity, enough to reach the default termination
/// threshold of 3.
pub const DEMO_SCENARIO: &[&str] = &[
    "Actividad anómala en servicio SSH",
    "Escaneo de puertos detectado desde 172.16.0.20",
    "Intento de login fallido desde IP 192.168.1.100",
    "Múltiples conexiones desde IP desconocida 10.0.0.50",
];

/// A running SOC pipeline: four agents sharing one capability directory.
pub struct SocPipeline {
    directory: CapabilityDirectory,
    detector: AgentId,
    injector: AgentId,
    // Kept alive so the injection identity stays addressable.
    _injector_mailbox: Mailbox,
    handles: Vec<AgentHandle>,
    responder: Option<AgentHandle>,
    reports: Option<mpsc::UnboundedReceiver<IncidentReport>>,
}

impl SocPipeline {
    /// Spawn all four agents. Downstream stages are spawned first so their
    /// capabilities are registered before any upstream stage can look them
    /// up and forward.
    pub fn launch(config: SocConfig) -> Self {
        let directory = CapabilityDirectory::new();
        let (report_tx, report_rx) = mpsc::unbounded_channel();

        let responder = AgentRuntime::spawn(
            "orquestador-respuesta",
            directory.clone(),
            ResponderBehavior::new(config.responder.incident_threshold)
                .with_report_sink(report_tx),
        );
        let enricher = AgentRuntime::spawn(
            "inteligencia-amenazas",
            directory.clone(),
            EnricherBehavior::new(config.intel.contexts),
        );
        let correlator = AgentRuntime::spawn(
            "correlador-eventos",
            directory.clone(),
            CorrelatorBehavior::new(),
        );
        let detector = AgentRuntime::spawn(
            "sensor-red",
            directory.clone(),
            DetectorBehavior::new(config.detector.known_events),
        );

        // Identity for the external event source.
        let (injector, injector_mailbox) = Mailbox::channel("consola-seguridad");

        info!(agents = 4, "SOC pipeline launched");
        Self {
            directory,
            detector: detector.id().clone(),
            injector,
            _injector_mailbox: injector_mailbox,
            handles: vec![detector, correlator, enricher],
            responder: Some(responder),
            reports: Some(report_rx),
        }
    }

    /// Read-only view of the capability directory.
    pub fn directory(&self) -> &CapabilityDirectory {
        &self.directory
    }

    /// Identity of the detection stage (the pipeline's entry point).
    pub fn detector(&self) -> &AgentId {
        &self.detector
    }

    /// Deliver a raw event string to the detector, as the external injection
    /// surface would.
    pub fn inject_event(&self, event: &str) -> Result<(), DeliveryError> {
        let envelope = Envelope::inform(
            self.injector.clone(),
            vec![self.detector.clone()],
            conversations::MANUAL_INJECTION,
            event,
        );
        self.detector.deliver(envelope)
    }

    /// Take the incident report stream. Available once.
    pub fn take_reports(&mut self) -> Option<mpsc::UnboundedReceiver<IncidentReport>> {
        self.reports.take()
    }

    /// Take the responder's handle, e.g. to await its bounded termination
    /// alongside other work. Available once; `shutdown` covers it only while
    /// still held.
    pub fn take_responder(&mut self) -> Option<AgentHandle> {
        self.responder.take()
    }

    /// Wait until the responder terminates (threshold reached or stopped).
    pub async fn wait_for_responder(&mut self) {
        if let Some(responder) = self.responder.as_mut() {
            responder.join().await;
        }
    }

    /// Stop every agent still owned by the pipeline and wait for their
    /// runtimes to finish.
    pub async fn shutdown(mut self) {
        if let Some(responder) = self.responder.take() {
            self.handles.push(responder);
        }
        for handle in &self.handles {
            handle.stop();
        }
        for mut handle in self.handles {
            handle.join().await;
        }
        info!("SOC pipeline stopped");
    }
}
