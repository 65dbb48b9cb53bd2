//! The message contract: commands sent to the user aggregate and the events it replies with.
//!
//! Commands are transient. Of the replies, only [`DomainEvent`] values are ever
//! written to the event log; everything else in [`UserEvent`] is a query result.

pub mod commands;
pub mod events;

pub use commands::*;
pub use events::*;
