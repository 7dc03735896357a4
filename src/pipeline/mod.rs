//! Pipeline stage logic
//!
//! The four agent behaviors of the SOC pipeline: detection, correlation,
//! enrichment and response. Each stage validates its input, transforms or
//! decides, and forwards to the next capability discovered through the
//! directory.

pub mod correlator;
pub mod detector;
pub mod enricher;
pub mod pattern;
pub mod responder;

pub use correlator::CorrelatorBehavior;
pub use detector::DetectorBehavior;
pub use enricher::EnricherBehavior;
pub use pattern::{classify_latest, AttackPattern};
pub use responder::{
    countermeasures_for, decide, Countermeasure, IncidentReport, ResponderBehavior, ResponderState,
};
