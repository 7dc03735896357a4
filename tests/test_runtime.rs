//! Runtime loop behavior: dispatch order, lifecycle, capability-addressed
//! forwarding.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use socmesh::agent::{
    AgentContext, AgentHandle, AgentRuntime, Behavior, CapabilityDirectory, Flow, Mailbox,
};
use socmesh::protocol::{Envelope, Performative};

/// Records every payload it sees, optionally terminating after a quota.
struct Collector {
    capability: &'static str,
    seen: Arc<Mutex<Vec<String>>>,
    terminate_after: Option<usize>,
}

#[async_trait]
impl Behavior for Collector {
    fn advertisements(&self) -> Vec<(String, String)> {
        vec![(self.capability.to_string(), "recolector".to_string())]
    }

    async fn on_envelope(&mut self, _ctx: &AgentContext, envelope: Envelope) -> Flow {
        let mut seen = self.seen.lock().unwrap();
        seen.push(envelope.payload().to_string());
        match self.terminate_after {
            Some(limit) if seen.len() >= limit => Flow::Terminate,
            _ => Flow::Continue,
        }
    }
}

/// Re-forwards every payload to the holder of a downstream capability.
struct Relay {
    downstream: &'static str,
}

#[async_trait]
impl Behavior for Relay {
    fn advertisements(&self) -> Vec<(String, String)> {
        vec![("retransmision".to_string(), "relevo".to_string())]
    }

    async fn on_envelope(&mut self, ctx: &AgentContext, envelope: Envelope) -> Flow {
        ctx.forward_first(
            self.downstream,
            Performative::Inform,
            envelope.conversation_id(),
            envelope.payload(),
        );
        Flow::Continue
    }
}

fn collector(
    capability: &'static str,
    terminate_after: Option<usize>,
) -> (Collector, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    (
        Collector {
            capability,
            seen: seen.clone(),
            terminate_after,
        },
        seen,
    )
}

fn external_source(name: &str) -> socmesh::agent::AgentId {
    let (id, mailbox) = Mailbox::channel(name);
    std::mem::forget(mailbox);
    id
}

async fn drain(handle: &mut AgentHandle) {
    handle.stop();
    handle.join().await;
}

#[tokio::test]
async fn test_envelopes_dispatched_in_arrival_order() {
    let directory = CapabilityDirectory::new();
    let (behavior, seen) = collector("recoleccion", Some(5));
    let mut handle = AgentRuntime::spawn("recolector", directory, behavior);

    let source = external_source("consola");
    let target = handle.id().clone();
    for n in 1..=5 {
        target
            .deliver(Envelope::inform(
                source.clone(),
                vec![target.clone()],
                "orden",
                format!("mensaje-{n}"),
            ))
            .unwrap();
    }

    handle.join().await;
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "mensaje-1",
            "mensaje-2",
            "mensaje-3",
            "mensaje-4",
            "mensaje-5"
        ]
    );
}

#[tokio::test]
async fn test_forwarding_reaches_capability_holder() {
    let directory = CapabilityDirectory::new();

    // Downstream first, so the relay's lookup can never miss.
    let (behavior, seen) = collector("recoleccion", Some(1));
    let mut sink = AgentRuntime::spawn("recolector", directory.clone(), behavior);
    let mut relay = AgentRuntime::spawn(
        "relevo",
        directory.clone(),
        Relay {
            downstream: "recoleccion",
        },
    );

    let source = external_source("consola");
    let relay_id = relay.id().clone();
    relay_id
        .deliver(Envelope::inform(
            source,
            vec![relay_id.clone()],
            "cadena",
            "carga",
        ))
        .unwrap();

    sink.join().await;
    assert_eq!(*seen.lock().unwrap(), vec!["carga"]);
    drain(&mut relay).await;
}

#[tokio::test]
async fn test_forwarding_without_holder_is_soft_failure() {
    let directory = CapabilityDirectory::new();
    let mut relay = AgentRuntime::spawn(
        "relevo",
        directory.clone(),
        Relay {
            downstream: "capacidad-inexistente",
        },
    );

    let source = external_source("consola");
    let relay_id = relay.id().clone();
    relay_id
        .deliver(Envelope::inform(
            source.clone(),
            vec![relay_id.clone()],
            "cadena",
            "perdido",
        ))
        .unwrap();

    // The relay must survive the miss and keep accepting messages.
    tokio::task::yield_now().await;
    assert!(relay_id.is_reachable());
    drain(&mut relay).await;
}

#[tokio::test]
async fn test_stop_during_idle_wait_deregisters() {
    let directory = CapabilityDirectory::new();
    let (behavior, _seen) = collector("recoleccion", None);
    let mut handle = AgentRuntime::spawn("recolector", directory.clone(), behavior);

    // Let the runtime reach its suspension point before signalling.
    tokio::task::yield_now().await;
    handle.stop();
    handle.join().await;

    assert!(handle.is_finished());
    assert!(directory.lookup("recoleccion").is_empty());
    assert_eq!(directory.advertisement_count(), 0);
}

#[tokio::test]
async fn test_self_termination_is_observable_through_delivery_error() {
    let directory = CapabilityDirectory::new();
    let (behavior, _seen) = collector("recoleccion", Some(1));
    let mut handle = AgentRuntime::spawn("recolector", directory, behavior);

    let source = external_source("consola");
    let target = handle.id().clone();
    target
        .deliver(Envelope::inform(
            source.clone(),
            vec![target.clone()],
            "fin",
            "ultimo",
        ))
        .unwrap();
    handle.join().await;

    let late = Envelope::inform(source, vec![target.clone()], "fin", "tarde");
    let err = target.deliver(late).unwrap_err();
    assert_eq!(err.recipient, "recolector");
}
