//! # Processor Client
//!
//! The sending half of an [`AggregateActor`](crate::framework::AggregateActor) mailbox.

use crate::framework::aggregate::Aggregate;
use crate::framework::context::RequestContext;
use crate::framework::error::FrameworkError;
use crate::framework::message::AggregateRequest;
use tokio::sync::{mpsc, oneshot};

/// ## AggregateClient
///
/// A cheap, cloneable handle that enqueues commands for a processor. Cloning only clones
/// the sender, and the handle stays valid across supervised restarts because the
/// supervisor keeps the mailbox.
#[derive(Clone)]
pub struct AggregateClient<A: Aggregate> {
    sender: mpsc::Sender<AggregateRequest<A>>,
}

impl<A: Aggregate> AggregateClient<A> {
    pub fn new(sender: mpsc::Sender<AggregateRequest<A>>) -> Self {
        Self { sender }
    }

    /// Enqueues a command and hands back the pending reply without waiting for it.
    pub async fn dispatch(
        &self,
        cmd: A::Command,
        ctx: RequestContext,
    ) -> Result<oneshot::Receiver<A::Reply>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(AggregateRequest::Execute { cmd, ctx, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        Ok(response)
    }

    /// Enqueues a command and waits for its reply.
    pub async fn execute(
        &self,
        cmd: A::Command,
        ctx: RequestContext,
    ) -> Result<A::Reply, FrameworkError> {
        let response = self.dispatch(cmd, ctx).await?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
