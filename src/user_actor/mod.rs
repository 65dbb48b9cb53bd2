//! User aggregate wiring: the [`Aggregate`](crate::framework::Aggregate) implementation
//! for [`Users`] and the supervised processor built from it.

pub mod aggregate;
pub mod error;

pub use error::*;

use crate::domain::Users;
use crate::framework::{SnapshotPolicy, Supervisor};
use crate::model::DomainEvent;
use crate::persistence::PersistenceProvider;
use std::sync::Arc;

/// Creates the supervisor for the user processor. Call `spawn` to start it.
pub fn supervisor(
    persistence_id: impl Into<String>,
    provider: Arc<dyn PersistenceProvider<DomainEvent, Users>>,
    snapshot_policy: SnapshotPolicy,
    mailbox_size: usize,
) -> Supervisor<Users> {
    Supervisor::new(persistence_id, provider)
        .with_snapshot_policy(snapshot_policy)
        .with_mailbox_size(mailbox_size)
}
