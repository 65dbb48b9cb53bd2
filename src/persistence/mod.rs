//! # Persistence Port
//!
//! The processor talks to storage only through [`PersistenceProvider`]: an append-only event
//! log plus indexed snapshots, both keyed by an opaque persistence id.
//!
//! [`InMemoryProvider`] is the reference implementation. It keeps everything in process
//! memory and loses it on restart; a durable implementation must keep the same
//! append-ordering and deep-copy guarantees.

pub mod error;
pub mod in_memory;

pub use error::*;
pub use in_memory::*;

use async_trait::async_trait;

/// Storage contract for event-sourced actors.
///
/// Event indexes start at 1, increase by one per append and are never reused.
#[async_trait]
pub trait PersistenceProvider<E, S>: Send + Sync
where
    E: Send + 'static,
    S: Send + Sync + 'static,
{
    /// Returns the snapshot with the highest index, if any.
    async fn read_latest_snapshot(
        &self,
        persistence_id: &str,
    ) -> Result<Option<(S, u64)>, PersistenceError>;

    /// Calls `visitor` for every stored event with `from_index <= index <= to_index`,
    /// in ascending index order. Returns the number of events visited.
    async fn read_events(
        &self,
        persistence_id: &str,
        from_index: u64,
        to_index: u64,
        visitor: &mut (dyn FnMut(u64, E) + Send),
    ) -> Result<u64, PersistenceError>;

    /// Appends an event and returns its index.
    async fn append_event(&self, persistence_id: &str, event: E) -> Result<u64, PersistenceError>;

    /// Stores a copy of `snapshot` tagged with `index`. The stored copy must not change when
    /// the caller later mutates its own value.
    async fn write_snapshot(
        &self,
        persistence_id: &str,
        index: u64,
        snapshot: &S,
    ) -> Result<(), PersistenceError>;

    /// Removes events with index `<= through_index`.
    async fn delete_events(
        &self,
        persistence_id: &str,
        through_index: u64,
    ) -> Result<(), PersistenceError>;

    /// Removes snapshots with index `<= through_index`.
    async fn delete_snapshots(
        &self,
        persistence_id: &str,
        through_index: u64,
    ) -> Result<(), PersistenceError>;
}
