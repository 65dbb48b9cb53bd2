//! # Aggregate Trait
//!
//! The `Aggregate` trait is the contract an event-sourced state type implements to be
//! driven by the generic [`AggregateActor`](crate::framework::AggregateActor). The actor owns
//! the mailbox loop, recovery and persistence; the aggregate only decides what a command
//! means and how a persisted event changes its state.
//!
//! # Architecture Note
//! We use associated types (`Command`, `Reply`, `Event`) so the compiler ties each aggregate
//! to its own message contract. You can't send a user command to some other aggregate's
//! processor.
//!
//! # Provided Methods (Hooks)
//! - [`Aggregate::should_crash`] is the fault-injection hook. The default never fires.

use crate::framework::context::RequestContext;
use std::fmt::Debug;

/// State that is rebuilt by replaying its own events.
///
/// `handle` is called for live commands; `apply` is called for each event read back during
/// recovery. For every reply that `event_for` turns into an event, applying that event to
/// the pre-command state must yield the same state `handle` produced.
pub trait Aggregate: Clone + Default + Send + Sync + 'static {
    /// Short name used in log fields.
    const NAME: &'static str;

    /// Commands accepted from callers.
    type Command: Send + Sync + Debug + 'static;

    /// Replies sent back to callers, including query results.
    type Reply: Send + Sync + Debug + 'static;

    /// The persisted subset of replies.
    type Event: Clone + Send + Sync + Debug + 'static;

    /// Faults that terminate the processor instance.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies a live command and describes the result.
    fn handle(&mut self, cmd: &Self::Command) -> Result<Self::Reply, Self::Error>;

    /// Folds a persisted event into the state.
    fn apply(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Returns the event to persist for a reply, or `None` for replies that change nothing.
    fn event_for(reply: &Self::Reply) -> Option<Self::Event>;

    /// The reply sent instead of a success when persisting fails.
    fn failure_reply(cmd: &Self::Command) -> Self::Reply;

    /// Called before `handle`. Returning `true` makes the command fail as if persistence
    /// were down, leaving both the state and the log untouched.
    fn should_crash(_cmd: &Self::Command, _ctx: &RequestContext) -> bool {
        false
    }
}
