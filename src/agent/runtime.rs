//! Agent runtime: cooperative scheduling loop around one mailbox
//!
//! Each agent runs as one tokio task. The loop attempts a non-blocking
//! dequeue, dispatches to the agent's behavior, and suspends only when the
//! mailbox is empty. Behavior dispatch runs to completion per message; there
//! is no mid-computation yield. A runtime terminates when the behavior
//! returns [`Flow::Terminate`] or the handle's `stop()` is called; it then
//! deregisters all capabilities and closes the mailbox, so later sends fail
//! with a delivery error.

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::agent::{AgentId, CapabilityDirectory, Mailbox};
use crate::protocol::{Envelope, Performative};

/// Outcome of one behavior dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep draining the mailbox.
    Continue,
    /// Graceful self-termination: deregister and stop the loop.
    Terminate,
}

/// Handles a behavior needs to interact with the rest of the system.
#[derive(Debug, Clone)]
pub struct AgentContext {
    id: AgentId,
    directory: CapabilityDirectory,
}

impl AgentContext {
    pub fn new(id: AgentId, directory: CapabilityDirectory) -> Self {
        Self { id, directory }
    }

    /// Identity of the owning agent.
    pub fn id(&self) -> &AgentId {
        &self.id
    }

    /// Shared capability directory.
    pub fn directory(&self) -> &CapabilityDirectory {
        &self.directory
    }

    /// Forward a payload to the first holder of `capability` in registration
    /// order. A lookup miss or a dead recipient is a soft failure: logged,
    /// nothing sent, pipeline stalls for this message. Returns whether the
    /// envelope was delivered.
    pub fn forward_first(
        &self,
        capability: &str,
        performative: Performative,
        conversation_id: &str,
        payload: impl Into<String>,
    ) -> bool {
        let Some(target) = self.directory.lookup_first(capability) else {
            warn!(
                agent = %self.id,
                capability,
                "no capability holder available, message not sent"
            );
            return false;
        };

        let envelope = Envelope::new(
            self.id.clone(),
            vec![target.clone()],
            performative,
            conversation_id,
            payload,
        );
        match target.deliver(envelope) {
            Ok(()) => {
                debug!(
                    agent = %self.id,
                    to = %target,
                    capability,
                    conversation_id,
                    %performative,
                    "envelope forwarded"
                );
                true
            }
            Err(e) => {
                warn!(agent = %self.id, error = %e, "delivery failed, message dropped");
                false
            }
        }
    }
}

/// A cooperative behavior owned by one agent runtime.
#[async_trait]
pub trait Behavior: Send {
    /// Capabilities advertised for the lifetime of this agent, as
    /// (capability tag, service name) pairs. Registered before the runtime
    /// loop starts draining the mailbox.
    fn advertisements(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Called once before the first dispatch.
    async fn on_start(&mut self, _ctx: &AgentContext) {}

    /// Handle one envelope. Runs to completion without yielding control to
    /// the scheduler in the middle of the pipeline stage logic.
    async fn on_envelope(&mut self, ctx: &AgentContext, envelope: Envelope) -> Flow;

    /// Called once after the loop stops and capabilities are deregistered.
    async fn on_stop(&mut self, _ctx: &AgentContext) {}
}

/// Handle to a spawned agent runtime, held by the bootstrap.
#[derive(Debug)]
pub struct AgentHandle {
    id: AgentId,
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
    joined: bool,
}

impl AgentHandle {
    /// Identity of the running agent.
    pub fn id(&self) -> &AgentId {
        &self.id
    }

    /// Request external termination. The runtime deregisters and halts after
    /// the current dispatch finishes.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Wait for the runtime task to finish. Returns immediately if it
    /// already has.
    pub async fn join(&mut self) {
        if self.joined {
            return;
        }
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                error!(agent = %self.id, error = %e, "agent task failed");
            }
        }
        self.joined = true;
    }

    /// Whether the runtime task has finished.
    pub fn is_finished(&self) -> bool {
        self.joined || self.task.is_finished()
    }
}

/// Spawner for agent runtimes.
pub struct AgentRuntime;

impl AgentRuntime {
    /// Create the agent's mailbox, register its advertised capabilities, and
    /// spawn the scheduling loop as a tokio task.
    ///
    /// Registration happens before the task is spawned, so by the time
    /// `spawn` returns the agent is discoverable — the bootstrap relies on
    /// this to wire downstream stages before upstream ones start forwarding.
    pub fn spawn<B>(name: &str, directory: CapabilityDirectory, behavior: B) -> AgentHandle
    where
        B: Behavior + 'static,
    {
        let (id, mailbox) = Mailbox::channel(name);
        let ctx = AgentContext::new(id.clone(), directory);

        for (capability, service_name) in behavior.advertisements() {
            ctx.directory()
                .register(ctx.id().clone(), &capability, &service_name);
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(Self::run(ctx, mailbox, behavior, stop_rx));

        AgentHandle {
            id,
            stop: stop_tx,
            task,
            joined: false,
        }
    }

    async fn run<B: Behavior>(
        ctx: AgentContext,
        mut mailbox: Mailbox,
        mut behavior: B,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        behavior.on_start(&ctx).await;
        info!(agent = %ctx.id(), "agent runtime started");

        loop {
            if *stop_rx.borrow() {
                info!(agent = %ctx.id(), "external stop requested");
                break;
            }

            // Non-blocking poll first; suspend only on an empty mailbox.
            let envelope = match mailbox.try_next() {
                Some(envelope) => envelope,
                None => {
                    tokio::select! {
                        changed = stop_rx.changed() => {
                            if changed.is_err() {
                                // Handle dropped without a stop signal; keep draining.
                                match mailbox.next().await {
                                    Some(envelope) => envelope,
                                    None => break,
                                }
                            } else {
                                continue;
                            }
                        }
                        maybe = mailbox.next() => match maybe {
                            Some(envelope) => envelope,
                            None => break,
                        },
                    }
                }
            };

            debug!(
                agent = %ctx.id(),
                from = %envelope.sender(),
                conversation_id = %envelope.conversation_id(),
                "dispatching envelope"
            );
            match behavior.on_envelope(&ctx, envelope).await {
                Flow::Continue => {}
                Flow::Terminate => {
                    info!(agent = %ctx.id(), "behavior requested termination");
                    break;
                }
            }
        }

        // Deregister before closing the mailbox so a lookup can never hand
        // out an identity whose runtime has already stopped draining.
        ctx.directory().deregister(ctx.id());
        mailbox.close();
        behavior.on_stop(&ctx).await;
        info!(agent = %ctx.id(), "agent runtime stopped");
    }
}
