//! # Messages
//!
//! Mailbox message types for the processor and the router.

use crate::framework::aggregate::Aggregate;
use crate::framework::context::RequestContext;
use crate::framework::error::FrameworkError;
use std::time::Duration;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the router.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Message sent to an [`AggregateActor`](crate::framework::AggregateActor).
///
/// The processor always answers with a domain reply. Plumbing failures (a crashed
/// instance, a gone caller) show up as a dropped channel instead.
#[derive(Debug)]
pub enum AggregateRequest<A: Aggregate> {
    Execute {
        cmd: A::Command,
        ctx: RequestContext,
        respond_to: oneshot::Sender<A::Reply>,
    },
}

/// Message sent to a [`Router`](crate::framework::Router).
#[derive(Debug)]
pub enum RouterRequest<A: Aggregate> {
    Forward {
        cmd: A::Command,
        ctx: RequestContext,
        timeout: Duration,
        respond_to: Response<A::Reply>,
    },
}
