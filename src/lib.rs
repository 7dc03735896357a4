//! socmesh - capability-driven SOC agent pipeline
//!
//! A multi-agent system that detects, correlates, enriches and responds to
//! security events purely through asynchronous message exchange. No central
//! controller issues commands: agents discover collaborators through a shared
//! capability directory and talk through addressed, conversation-tagged
//! envelopes.
//!
//! # Overview
//!
//! The crate is built from:
//! - a messaging substrate: [`protocol::Envelope`], per-agent [`agent::Mailbox`]
//!   queues and the [`agent::CapabilityDirectory`] (service discovery),
//! - a cooperative [`agent::AgentRuntime`] scheduling one behavior per agent,
//! - four pipeline stages (detection, correlation, enrichment, response) in
//!   [`pipeline`],
//! - a [`bootstrap::SocPipeline`] that wires everything together.
//!
//! # Quick Start
//!
//! ```rust
//! use socmesh::bootstrap::SocPipeline;
//! use socmesh::config::SocConfig;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut pipeline = SocPipeline::launch(SocConfig::default());
//! let mut reports = pipeline.take_reports().unwrap();
//!
//! // Two recognized events: the first warms up the correlation history,
//! // the second matches the brute-force pattern and flows to the responder.
//! pipeline
//!     .inject_event("Escaneo de puertos detectado desde 172.16.0.20")
//!     .unwrap();
//! pipeline
//!     .inject_event("Intento de login fallido desde IP 192.168.1.100")
//!     .unwrap();
//!
//! let report = reports.recv().await.unwrap();
//! assert_eq!(report.sequence, 1);
//! assert_eq!(report.status, "MITIGADO");
//! pipeline.shutdown().await;
//! # }
//! ```

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod protocol;

pub use agent::{
    AgentContext, AgentHandle, AgentId, AgentRuntime, Behavior, CapabilityDirectory,
    DeliveryError, Flow, Mailbox,
};
pub use bootstrap::SocPipeline;
pub use config::SocConfig;
pub use error::{SocError, SocResult};
pub use pipeline::{AttackPattern, IncidentReport};
pub use protocol::{Envelope, Performative};
