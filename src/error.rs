//! Crate error taxonomy
//!
//! Nothing in this design is fatal to the process: agents fail independently
//! and the pipeline degrades to silent stalls. The variants here cover the
//! few operations that do return errors — configuration loading, delivery to
//! a stopped agent, and I/O on the event source.

use thiserror::Error;

/// Top-level error type for pipeline operations.
#[derive(Debug, Error)]
pub enum SocError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] crate::agent::DeliveryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type SocResult<T> = Result<T, SocError>;
