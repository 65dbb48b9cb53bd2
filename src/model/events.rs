use crate::domain::{User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreated {
    pub id: UserId,
    pub name: String,
    pub created_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeleted {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRetrieved {
    pub id: UserId,
    pub name: String,
    pub created_on: DateTime<Utc>,
}

/// One page of users plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersRetrieved {
    pub total_count: usize,
    pub users: Vec<UserRetrieved>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotFound {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnexpectedErrorOccurred {
    pub id: UserId,
}

impl From<&User> for UserRetrieved {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            created_on: user.created_on(),
        }
    }
}

impl From<&User> for UserCreated {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_string(),
            created_on: user.created_on(),
        }
    }
}

/// Every reply the user aggregate can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UserEvent {
    UserCreated(UserCreated),
    UserDeleted(UserDeleted),
    UserRetrieved(UserRetrieved),
    UsersRetrieved(UsersRetrieved),
    UserNotFound(UserNotFound),
    UnexpectedErrorOccurred(UnexpectedErrorOccurred),
}

/// The subset of [`UserEvent`] that is written to the event log and replayed on recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    UserCreated(UserCreated),
    UserDeleted(UserDeleted),
}

/// Transport-neutral classification of a reply.
///
/// A boundary maps these onto its own status codes (201, 200, 204, 404, 400, 504).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Ok,
    NoContent,
    NotFound,
    BadRequest,
    TimedOut,
}

impl UserEvent {
    /// Returns the event to persist when this reply represents a state change.
    pub fn to_domain_event(&self) -> Option<DomainEvent> {
        match self {
            UserEvent::UserCreated(e) => Some(DomainEvent::UserCreated(e.clone())),
            UserEvent::UserDeleted(e) => Some(DomainEvent::UserDeleted(e.clone())),
            UserEvent::UserRetrieved(_)
            | UserEvent::UsersRetrieved(_)
            | UserEvent::UserNotFound(_)
            | UserEvent::UnexpectedErrorOccurred(_) => None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            UserEvent::UserCreated(_) => Outcome::Created,
            UserEvent::UserRetrieved(_) | UserEvent::UsersRetrieved(_) => Outcome::Ok,
            UserEvent::UserDeleted(_) => Outcome::NoContent,
            UserEvent::UserNotFound(_) => Outcome::NotFound,
            UserEvent::UnexpectedErrorOccurred(_) => Outcome::BadRequest,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UserEvent::UserCreated(_) => "UserCreated",
            UserEvent::UserDeleted(_) => "UserDeleted",
            UserEvent::UserRetrieved(_) => "UserRetrieved",
            UserEvent::UsersRetrieved(_) => "UsersRetrieved",
            UserEvent::UserNotFound(_) => "UserNotFound",
            UserEvent::UnexpectedErrorOccurred(_) => "UnexpectedErrorOccurred",
        }
    }
}

impl DomainEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            DomainEvent::UserCreated(e) => e.id,
            DomainEvent::UserDeleted(e) => e.id,
        }
    }
}
