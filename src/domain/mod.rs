//! Pure domain state: the [`User`] value object and the [`Users`] aggregate.
//!
//! Nothing in here performs I/O. The aggregate is driven by the processor in
//! [`crate::framework`] through the [`Aggregate`](crate::framework::Aggregate) implementation
//! in [`crate::user_actor`].

pub mod user;
pub mod users;

pub use user::*;
pub use users::*;
