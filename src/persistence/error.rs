//! Error types for the persistence port.

use thiserror::Error;

/// Errors that can occur while reading or writing events and snapshots.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A snapshot could not be copied through its serialized form.
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("Persistence store lock poisoned")]
    Poisoned,

    /// The backing store refused the operation.
    #[error("Persistence unavailable: {0}")]
    Unavailable(String),

    /// The write was failed on purpose by the fault-injection hook.
    #[error("Persistence disabled by fault injection")]
    FaultInjected,
}
