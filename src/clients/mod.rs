//! Type-safe wrappers around [`RouterClient`](crate::framework::RouterClient).

pub mod actor_client;
pub mod user_client;

pub use actor_client::*;
pub use user_client::*;
