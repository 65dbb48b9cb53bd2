//! # Observability & Tracing
//!
//! This module provides the tracing infrastructure for the user management core.
//!
//! ## Overview
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! Nothing in the core requires a subscriber: without one every macro is a no-op.
//!
//! The framework uses a compact format that hides the crate/module prefix (`with_target(false)`).
//! Log levels come from the `RUST_LOG` environment variable.
//!
//! ## What Gets Traced
//!
//! - **Lifecycle**: router, supervisor and processor startup and shutdown, restarts (`warn`)
//! - **Recovery**: the `recover_state` span with the snapshot index and the number of replayed events
//! - **Writes**: the `persist_event` span around every append and snapshot
//! - **Requests**: the `user_request` span opened by each client call
//! - **Failures**: persistence errors at `error`, timeouts at `warn`, dead letters at `debug`
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle and state changes
//! RUST_LOG=info cargo run
//!
//! # Every command and dead letter
//! RUST_LOG=debug cargo run
//!
//! # Only the processor
//! RUST_LOG=user_management::framework::actor=debug cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Supervisor started aggregate="Users" persistence_id=user-actor
//! INFO recover_state: Recovered replayed=0 last_index=0
//! INFO Processor started aggregate="Users" persistence_id=user-actor
//! INFO persist_event: Persisted index=1
//! ```

/// Installs the global subscriber. Panics if one is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`], but a no-op when a subscriber is already installed.
/// Meant for tests, where many cases share one process.
pub fn try_setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_test_writer()
        .try_init();
}
