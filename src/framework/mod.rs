//! Generic actor framework for event-sourced aggregates.
//!
//! This module provides the building blocks for running an aggregate behind a mailbox:
//! recovery from a persistence port, ordered command execution, supervised restarts and
//! a router that bounds every request with a deadline.
//!
//! # Main Components
//!
//! - [`Aggregate`] - Trait that state types implement to be driven by a processor
//! - [`AggregateActor`] - Generic processor that recovers, executes and persists
//! - [`Supervisor`] - Restarts the processor after a failure, keeping its mailbox
//! - [`Router`] - Entry point that creates the processor lazily and relays replies
//! - [`AggregateClient`] / [`RouterClient`] - Typed handles for sending commands
//! - [`FrameworkError`] / [`ActorFailure`] - Plumbing errors
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test routers and clients without spawning a processor.

pub mod actor;
pub mod aggregate;
pub mod client;
pub mod context;
pub mod error;
pub mod message;
pub mod mock;
pub mod router;
pub mod supervisor;

pub use actor::{AggregateActor, ProcessorPhase, SnapshotPolicy};
pub use aggregate::Aggregate;
pub use client::AggregateClient;
pub use context::{ChaosType, RequestContext, CHAOS_TYPE_HEADER};
pub use error::{ActorFailure, FrameworkError};
pub use message::{AggregateRequest, Response, RouterRequest};
pub use router::{ProcessorFactory, Router, RouterClient};
pub use supervisor::{Registry, Supervisor, SupervisorHandle};
