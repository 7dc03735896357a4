//! Protocol message types for the SOC agent pipeline
//!
//! This module defines the envelope structure and the literal string
//! vocabulary (capability tags, conversation ids, payload prefixes) that
//! together form the cross-agent contract.

pub mod messages;

pub use messages::*;
