//! Error types for the User actor.

use crate::domain::UserValidationError;
use crate::framework::FrameworkError;
use crate::model::Outcome;
use std::time::Duration;
use thiserror::Error;

/// Errors a caller of [`UserClient`](crate::clients::UserClient) can see.
///
/// Domain results such as a missing user are replies, not errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    /// No reply arrived before the request deadline.
    #[error("User request timed out after {after:?}")]
    Timeout { after: Duration },

    /// The user data provided is invalid.
    #[error("User validation error: {0}")]
    Validation(#[from] UserValidationError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl UserError {
    pub fn outcome(&self) -> Outcome {
        match self {
            UserError::Timeout { .. } => Outcome::TimedOut,
            UserError::Validation(_) | UserError::ActorCommunicationError(_) => Outcome::BadRequest,
        }
    }
}

impl From<FrameworkError> for UserError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Timeout { after } => UserError::Timeout { after },
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
