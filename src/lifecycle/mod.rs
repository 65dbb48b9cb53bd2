//! System wiring: configuration, startup and shutdown, and tracing setup.

pub mod config;
pub mod tracing;
pub mod user_system;

pub use config::*;
pub use self::tracing::*;
pub use user_system::*;
