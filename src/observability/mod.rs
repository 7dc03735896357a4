//! Observability: structured logging setup
//!
//! The pipeline logs every protocol step (reception, validation, forwarding,
//! countermeasures, reports) through `tracing`; this module configures the
//! subscriber.

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
