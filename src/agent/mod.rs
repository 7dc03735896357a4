//! Agent concurrency substrate
//!
//! Identities and mailboxes, the capability directory, and the cooperative
//! runtime loop that schedules one behavior per agent.

pub mod directory;
pub mod mailbox;
pub mod runtime;

pub use directory::{Advertisement, CapabilityDirectory};
pub use mailbox::{AgentId, DeliveryError, Mailbox};
pub use runtime::{AgentContext, AgentHandle, AgentRuntime, Behavior, Flow};
