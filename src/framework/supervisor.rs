//! # Supervision
//!
//! A [`Supervisor`] keeps one aggregate processor alive. It owns the processor's mailbox and
//! runs instances of [`AggregateActor`] against it in a loop: when an instance fails, a new
//! one is built, recovers from the persistence port and carries on with the queued messages.
//! An instance fails by returning an [`ActorFailure`](crate::framework::ActorFailure) or by
//! panicking.
//!
//! The restart policy is unconditional: no backoff and no failure budget.

use crate::framework::actor::{AggregateActor, SnapshotPolicy};
use crate::framework::aggregate::Aggregate;
use crate::framework::client::AggregateClient;
use crate::framework::message::AggregateRequest;
use crate::persistence::PersistenceProvider;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Builder for a supervised processor.
pub struct Supervisor<A: Aggregate> {
    persistence_id: String,
    provider: Arc<dyn PersistenceProvider<A::Event, A>>,
    snapshot_policy: SnapshotPolicy,
    mailbox_size: usize,
    restarts: Arc<AtomicU64>,
}

/// A running supervised processor.
pub struct SupervisorHandle<A: Aggregate> {
    client: AggregateClient<A>,
    restarts: Arc<AtomicU64>,
    join: JoinHandle<()>,
}

impl<A: Aggregate> Supervisor<A> {
    pub fn new(
        persistence_id: impl Into<String>,
        provider: Arc<dyn PersistenceProvider<A::Event, A>>,
    ) -> Self {
        Self {
            persistence_id: persistence_id.into(),
            provider,
            snapshot_policy: SnapshotPolicy::default(),
            mailbox_size: 32,
            restarts: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_snapshot_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.snapshot_policy = policy;
        self
    }

    pub fn with_mailbox_size(mut self, size: usize) -> Self {
        self.mailbox_size = size.max(1);
        self
    }

    /// Shares a restart counter, e.g. with a [`Registry`].
    pub fn with_restart_counter(mut self, restarts: Arc<AtomicU64>) -> Self {
        self.restarts = restarts;
        self
    }

    /// Creates the mailbox and starts the supervision loop in its own task.
    pub fn spawn(self) -> SupervisorHandle<A> {
        let (sender, receiver) = mpsc::channel(self.mailbox_size);
        let restarts = self.restarts.clone();
        let join = tokio::spawn(self.supervise(receiver));
        SupervisorHandle {
            client: AggregateClient::new(sender),
            restarts,
            join,
        }
    }

    async fn supervise(self, mut receiver: mpsc::Receiver<AggregateRequest<A>>) {
        info!(aggregate = A::NAME, persistence_id = %self.persistence_id, "Supervisor started");

        loop {
            let mut actor = AggregateActor::<A>::new(
                self.persistence_id.clone(),
                self.provider.clone(),
                self.snapshot_policy,
            );

            let failure = match AssertUnwindSafe(actor.run(&mut receiver)).catch_unwind().await {
                Ok(Ok(())) => break,
                Ok(Err(failure)) => failure.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };

            if receiver.is_closed() && receiver.is_empty() {
                error!(aggregate = A::NAME, error = %failure, "Processor failed after shutdown");
                break;
            }
            let restarts = self.restarts.fetch_add(1, Ordering::SeqCst) + 1;
            warn!(aggregate = A::NAME, error = %failure, restarts, "Processor failed, restarting");
            tokio::task::yield_now().await;
        }

        info!(aggregate = A::NAME, "Supervisor stopped");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

impl<A: Aggregate> SupervisorHandle<A> {
    pub fn client(&self) -> AggregateClient<A> {
        self.client.clone()
    }

    /// Number of times the processor has been restarted.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::SeqCst)
    }

    pub fn into_parts(self) -> (AggregateClient<A>, JoinHandle<()>) {
        (self.client, self.join)
    }

    /// Closes the mailbox and waits for the supervision loop to finish.
    ///
    /// Other clones of the client keep the processor alive until they are dropped too.
    pub async fn shutdown(self) -> Result<(), String> {
        drop(self.client);
        self.join
            .await
            .map_err(|e| format!("Supervisor task failed: {:?}", e))
    }
}

/// Tracks every supervised processor spawned on behalf of a system, so it can be joined on
/// shutdown, and counts their restarts.
#[derive(Clone, Default)]
pub struct Registry {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    restarts: Arc<AtomicU64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter to pass to [`Supervisor::with_restart_counter`].
    pub fn restart_counter(&self) -> Arc<AtomicU64> {
        self.restarts.clone()
    }

    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::SeqCst)
    }

    /// Keeps the task handle and returns the processor client.
    pub fn register<A: Aggregate>(&self, handle: SupervisorHandle<A>) -> AggregateClient<A> {
        let (client, join) = handle.into_parts();
        match self.handles.lock() {
            Ok(mut handles) => handles.push(join),
            Err(_) => warn!(aggregate = A::NAME, "Registry lock poisoned, processor untracked"),
        }
        client
    }

    /// Waits for every registered supervisor to stop.
    pub async fn join_all(&self) -> Result<(), String> {
        let handles = match self.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(_) => return Err("Registry lock poisoned".to_string()),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Supervisor task failed: {:?}", e);
                return Err(format!("Supervisor task failed: {:?}", e));
            }
        }
        Ok(())
    }
}
