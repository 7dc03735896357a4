//! Agent identities and per-agent mailboxes
//!
//! Each agent owns exactly one [`Mailbox`]; the matching [`AgentId`] is the
//! cheap-to-clone handle everyone else uses to address it. Mailboxes are
//! unbounded FIFO queues: a fast producer can grow a slow consumer's queue
//! without limit. That is an accepted design limitation, not a bug.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::protocol::Envelope;

/// Delivery to an agent whose mailbox has been closed (runtime stopped).
///
/// Surfacing the failure as a `Result` lets the sender log the dead
/// recipient. No retry is attempted.
#[derive(Debug, Error)]
#[error("mailbox of agent '{recipient}' is closed")]
pub struct DeliveryError {
    /// Name of the unreachable agent.
    pub recipient: String,
}

/// Opaque agent identity: a name plus the process-local mailbox address.
///
/// Equality, ordering and hashing consider the name only, so an `AgentId` can
/// key directory entries while still carrying the delivery address.
#[derive(Debug, Clone)]
pub struct AgentId {
    name: Arc<str>,
    address: mpsc::UnboundedSender<Envelope>,
}

impl AgentId {
    /// Local name of the agent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue an envelope into the agent's mailbox.
    ///
    /// Best-effort: fails only when the receiving runtime has stopped.
    pub fn deliver(&self, envelope: Envelope) -> Result<(), DeliveryError> {
        self.address.send(envelope).map_err(|_| DeliveryError {
            recipient: self.name.to_string(),
        })
    }

    /// Whether the agent's mailbox is still accepting messages.
    pub fn is_reachable(&self) -> bool {
        !self.address.is_closed()
    }
}

impl PartialEq for AgentId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AgentId {}

impl Hash for AgentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// FIFO queue of envelopes owned by a single agent runtime.
#[derive(Debug)]
pub struct Mailbox {
    owner: Arc<str>,
    queue: mpsc::UnboundedReceiver<Envelope>,
}

impl Mailbox {
    /// Create a mailbox and the identity that addresses it.
    pub fn channel(name: impl Into<String>) -> (AgentId, Mailbox) {
        let name: Arc<str> = Arc::from(name.into());
        let (tx, rx) = mpsc::unbounded_channel();
        (
            AgentId {
                name: name.clone(),
                address: tx,
            },
            Mailbox {
                owner: name,
                queue: rx,
            },
        )
    }

    /// Name of the owning agent.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Non-blocking poll. Returns `None` when the mailbox is currently empty.
    pub fn try_next(&mut self) -> Option<Envelope> {
        match self.queue.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Suspend until an envelope arrives. This is the runtime's only
    /// suspension point. Returns `None` once every addressing handle has
    /// been dropped.
    pub async fn next(&mut self) -> Option<Envelope> {
        self.queue.recv().await
    }

    /// Stop accepting deliveries. Later `deliver` calls on the matching
    /// identity fail with [`DeliveryError`].
    pub fn close(&mut self) {
        self.queue.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{conversations, Envelope};

    fn envelope(from: &AgentId, to: &AgentId, payload: &str) -> Envelope {
        Envelope::inform(
            from.clone(),
            vec![to.clone()],
            conversations::MANUAL_INJECTION,
            payload,
        )
    }

    #[test]
    fn test_identity_equality_by_name_only() {
        let (first, _a) = Mailbox::channel("sensor-red");
        let (second, _b) = Mailbox::channel("sensor-red");
        let (other, _c) = Mailbox::channel("correlador");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.to_string(), "sensor-red");
    }

    #[test]
    fn test_fifo_order_preserved() {
        let (source, _source_mailbox) = Mailbox::channel("fuente");
        let (id, mut mailbox) = Mailbox::channel("sensor-red");

        for payload in ["m1", "m2", "m3"] {
            id.deliver(envelope(&source, &id, payload)).unwrap();
        }

        assert_eq!(mailbox.try_next().unwrap().payload(), "m1");
        assert_eq!(mailbox.try_next().unwrap().payload(), "m2");
        assert_eq!(mailbox.try_next().unwrap().payload(), "m3");
        assert!(mailbox.try_next().is_none());
    }

    #[test]
    fn test_deliver_to_closed_mailbox_fails() {
        let (source, _source_mailbox) = Mailbox::channel("fuente");
        let (id, mut mailbox) = Mailbox::channel("sensor-red");

        assert!(id.is_reachable());
        mailbox.close();

        let err = id.deliver(envelope(&source, &id, "tarde")).unwrap_err();
        assert_eq!(err.recipient, "sensor-red");
        assert!(!id.is_reachable());
    }

    #[tokio::test]
    async fn test_next_suspends_until_delivery() {
        let (source, _source_mailbox) = Mailbox::channel("fuente");
        let (id, mut mailbox) = Mailbox::channel("sensor-red");

        let sender = id.clone();
        let probe = envelope(&source, &id, "diferido");
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            sender.deliver(probe).unwrap();
        });

        let received = mailbox.next().await.unwrap();
        assert_eq!(received.payload(), "diferido");
    }
}
