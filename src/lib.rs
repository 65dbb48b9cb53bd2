#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # User Management
//!
//! > **An event-sourced user store driven by Tokio actors.**
//!
//! This crate manages a single collection of users through commands and queries. Every
//! state change is written to an append-only event log and snapshotted; after a crash
//! the state is rebuilt from the latest snapshot plus the events after it.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Why Event Sourcing + Actor Model?
//!
//! - **Event Sourcing**: The log is the source of truth. State is a fold over events, so it
//!   can always be rebuilt.
//! - **Actor Model**: One task owns the state and handles one message at a time. No locks,
//!   and the log order is the mailbox order.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: The Power of `A`
//! You'll see `AggregateActor<A: Aggregate>` everywhere. The processor loop, recovery,
//! snapshots and supervision are written **once**; [`Users`](domain::Users) only says what a
//! command means and how an event changes it.
//!
//! ### Replies, Not Errors
//! A missing user is a reply ([`UserEvent::UserNotFound`](model::UserEvent::UserNotFound)),
//! not an `Err`. Errors are reserved for plumbing: timeouts and closed actors.
//!
//! ### Mocking: Testing without Pain
//! The router and clients can be tested against a `MockClient` that answers, or never answers,
//! on cue. See the [`framework::mock`] module.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Supervised Restarts
//! A command that fails validation crashes the processor instance. The supervisor keeps the
//! mailbox, builds a new instance, recovers it from persistence and carries on. Callers of the
//! crashed command see an error; everyone else is unaffected.
//!
//! ### 2. Deadlines
//! Every request carries a timeout. The router relays replies from detached tasks, so a slow
//! command never blocks the ones behind it. Late replies are dropped as dead letters.
//!
//! ### 3. Fault Injection
//! A [`RequestContext`](framework::RequestContext) can carry
//! [`ChaosType::CreateUserDown`](framework::ChaosType::CreateUserDown). Creates in that request
//! then fail as if the store were down, without touching state or log.
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured fields and spans around recovery, writes and
//! requests. See the [`lifecycle::tracing`] module for details.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: Generic processor, supervisor, router and their clients.
//! - **Key items**: [`Aggregate`](framework::Aggregate), [`AggregateActor`](framework::AggregateActor),
//!   [`Router`](framework::Router).
//!
//! ### 2. The Storage Port ([`persistence`])
//! - **Role**: Event log and snapshot contract, plus an in-memory implementation.
//! - **Key items**: [`PersistenceProvider`](persistence::PersistenceProvider),
//!   [`InMemoryProvider`](persistence::InMemoryProvider).
//!
//! ### 3. The Domain ([`domain`], [`model`], [`user_actor`])
//! - **Role**: The user aggregate, its commands and events, and its wiring into the engine.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! - **Role**: Configuration, startup and graceful shutdown.
//! - **Key items**: [`UserSystem`](lifecycle::UserSystem), [`SystemConfig`](lifecycle::SystemConfig).
//!
//! ### 5. The Interface ([`clients`])
//! - **Role**: Typed calls with per-request deadlines.
//! - **Key items**: [`UserClient`](clients::UserClient).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Run the tests
//! cargo test
//! ```

pub mod clients;
pub mod domain;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod persistence;
pub mod user_actor;
