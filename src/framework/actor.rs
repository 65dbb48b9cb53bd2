//! # Aggregate Processor
//!
//! This module defines the `AggregateActor`, the server side of an event-sourced aggregate.
//! It owns the aggregate state, rebuilds it from the persistence port before serving any
//! command, and persists every state-changing reply before answering the caller.

use crate::framework::aggregate::Aggregate;
use crate::framework::context::RequestContext;
use crate::framework::error::ActorFailure;
use crate::framework::message::AggregateRequest;
use crate::persistence::{PersistenceError, PersistenceProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// How often the processor writes a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPolicy {
    /// Snapshot after every `every`-th event. `0` disables snapshots.
    pub every: u64,
    /// After a snapshot at index `i`, delete events `<= i` and older snapshots.
    pub compact_on_snapshot: bool,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            every: 1,
            compact_on_snapshot: false,
        }
    }
}

impl SnapshotPolicy {
    pub fn is_due(&self, index: u64) -> bool {
        self.every != 0 && index % self.every == 0
    }
}

/// Lifecycle of one processor instance. A crashed instance is discarded; its
/// replacement starts again at `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorPhase {
    Uninitialized,
    Recovering,
    Ready,
}

/// The event-sourced actor that owns one aggregate.
///
/// # Architecture Note
/// Like every actor here, the processor handles one message at a time. A command's
/// persistence writes are awaited before the next message is read, so effects hit the log
/// in the same order commands arrived and the state needs no lock.
///
/// # Operations
///
/// * **Recover**: load the latest snapshot, then replay every later event through
///   [`Aggregate::apply`].
/// * **Execute**:
///     1. Consult [`Aggregate::should_crash`]; a hit fails the command before anything changes.
///     2. Run [`Aggregate::handle`] against the current state.
///     3. If [`Aggregate::event_for`] yields an event, append it and write a snapshot.
///     4. A failed write replies [`Aggregate::failure_reply`]. The state keeps the change
///        and nothing is retried.
///
/// An `Err` from `handle` or `apply` ends the instance with an [`ActorFailure`]; the
/// [`Supervisor`](crate::framework::Supervisor) then starts a fresh one.
pub struct AggregateActor<A: Aggregate> {
    persistence_id: String,
    provider: Arc<dyn PersistenceProvider<A::Event, A>>,
    snapshot_policy: SnapshotPolicy,
    state: A,
    phase: ProcessorPhase,
    last_index: u64,
}

impl<A: Aggregate> AggregateActor<A> {
    pub fn new(
        persistence_id: impl Into<String>,
        provider: Arc<dyn PersistenceProvider<A::Event, A>>,
        snapshot_policy: SnapshotPolicy,
    ) -> Self {
        Self {
            persistence_id: persistence_id.into(),
            provider,
            snapshot_policy,
            state: A::default(),
            phase: ProcessorPhase::Uninitialized,
            last_index: 0,
        }
    }

    pub fn phase(&self) -> ProcessorPhase {
        self.phase
    }

    pub fn state(&self) -> &A {
        &self.state
    }

    /// Index of the last event reflected in the state.
    pub fn last_index(&self) -> u64 {
        self.last_index
    }

    /// Rebuilds the state from the latest snapshot plus every event after it.
    pub async fn recover(&mut self) -> Result<(), ActorFailure> {
        self.phase = ProcessorPhase::Recovering;
        let span = info_span!(
            "recover_state",
            aggregate = A::NAME,
            persistence_id = %self.persistence_id
        );

        async {
            let mut state = A::default();
            let mut last_index = 0;

            if let Some((snapshot, index)) = self
                .provider
                .read_latest_snapshot(&self.persistence_id)
                .await
                .map_err(ActorFailure::Recovery)?
            {
                debug!(index, "Snapshot loaded");
                state = snapshot;
                last_index = index;
            }

            let mut replay_error: Option<(u64, String)> = None;
            let replayed = self
                .provider
                .read_events(
                    &self.persistence_id,
                    last_index + 1,
                    u64::MAX,
                    &mut |index, event| {
                        if replay_error.is_some() {
                            return;
                        }
                        match state.apply(&event) {
                            Ok(()) => last_index = index,
                            Err(e) => replay_error = Some((index, e.to_string())),
                        }
                    },
                )
                .await
                .map_err(ActorFailure::Recovery)?;

            if let Some((index, reason)) = replay_error {
                return Err(ActorFailure::Replay { index, reason });
            }

            self.state = state;
            self.last_index = last_index;
            self.phase = ProcessorPhase::Ready;
            info!(replayed, last_index, "Recovered");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Runs the message loop until every sender is gone.
    ///
    /// Recovers first if needed. The receiver is borrowed so a supervisor can hand the same
    /// mailbox to the next instance after a failure; messages still queued survive the restart.
    pub async fn run(
        &mut self,
        receiver: &mut mpsc::Receiver<AggregateRequest<A>>,
    ) -> Result<(), ActorFailure> {
        if self.phase != ProcessorPhase::Ready {
            self.recover().await?;
        }
        info!(aggregate = A::NAME, persistence_id = %self.persistence_id, "Processor started");

        while let Some(msg) = receiver.recv().await {
            match msg {
                AggregateRequest::Execute { cmd, ctx, respond_to } => {
                    // On failure `respond_to` is dropped and the caller sees ActorDropped.
                    let reply = self.execute(&cmd, &ctx).await?;
                    if let Err(reply) = respond_to.send(reply) {
                        warn!(aggregate = A::NAME, ?reply, "Dead letter: caller gone");
                    }
                }
            }
        }

        info!(aggregate = A::NAME, last_index = self.last_index, "Shutdown");
        Ok(())
    }

    async fn execute(
        &mut self,
        cmd: &A::Command,
        ctx: &RequestContext,
    ) -> Result<A::Reply, ActorFailure> {
        debug!(aggregate = A::NAME, ?cmd, correlation_id = ?ctx.correlation_id, "Execute");

        let persisted = if A::should_crash(cmd, ctx) {
            warn!(aggregate = A::NAME, chaos = ctx.chaos.map(|c| c.as_str()), "Fault injection enabled for request");
            Err(PersistenceError::FaultInjected)
        } else {
            let reply = self.state.handle(cmd).map_err(|e| ActorFailure::Handler {
                command: format!("{cmd:?}"),
                reason: e.to_string(),
            })?;
            match A::event_for(&reply) {
                Some(event) => self.persist(event).await.map(|_| reply),
                None => return Ok(reply),
            }
        };

        match persisted {
            Ok(reply) => Ok(reply),
            Err(e) => {
                error!(aggregate = A::NAME, ?cmd, error = %e, "Persisting event failed");
                Ok(A::failure_reply(cmd))
            }
        }
    }

    /// Appends `event` and, when due, snapshots the current state at the new index.
    async fn persist(&mut self, event: A::Event) -> Result<u64, PersistenceError> {
        let span = info_span!("persist_event", aggregate = A::NAME, event = ?event);

        async {
            let index = self
                .provider
                .append_event(&self.persistence_id, event)
                .await?;
            self.last_index = index;

            if self.snapshot_policy.is_due(index) {
                self.provider
                    .write_snapshot(&self.persistence_id, index, &self.state)
                    .await?;
                if self.snapshot_policy.compact_on_snapshot {
                    self.provider
                        .delete_events(&self.persistence_id, index)
                        .await?;
                    self.provider
                        .delete_snapshots(&self.persistence_id, index - 1)
                        .await?;
                    debug!(index, "Compacted");
                }
            }

            info!(index, "Persisted");
            Ok(index)
        }
        .instrument(span)
        .await
    }
}
