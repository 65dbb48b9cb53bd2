//! # Framework Errors
//!
//! Errors raised by the actor plumbing itself, as opposed to domain replies.
//! Domain outcomes such as "user not found" travel as ordinary replies and never
//! show up here.

use crate::persistence::PersistenceError;
use std::time::Duration;

/// Errors observed by a caller talking to an actor.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },
}

/// Failure that terminates a processor instance and triggers a supervised restart.
#[derive(Debug, thiserror::Error)]
pub enum ActorFailure {
    #[error("Recovery failed: {0}")]
    Recovery(#[source] PersistenceError),
    #[error("Replaying event {index} failed: {reason}")]
    Replay { index: u64, reason: String },
    #[error("Unhandled failure while handling {command}: {reason}")]
    Handler { command: String, reason: String },
}
