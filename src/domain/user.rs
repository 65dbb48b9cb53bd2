use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Opaque identifier of a user. The nil UUID is never a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a fresh, time-ordered id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Reasons a [`User`] cannot be constructed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("User ID must not be empty")]
    EmptyId,

    #[error("User name must not be empty")]
    EmptyName,

    #[error("Created on date must not be empty")]
    MissingCreatedOn,
}

/// A registered user.
///
/// Fields are private so every `User` in the aggregate has passed [`User::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    created_on: DateTime<Utc>,
}

impl User {
    /// Builds a validated user.
    ///
    /// # Errors
    /// * [`UserValidationError::EmptyId`] for the nil id
    /// * [`UserValidationError::EmptyName`] for an empty name
    /// * [`UserValidationError::MissingCreatedOn`] for the minimum timestamp
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        created_on: DateTime<Utc>,
    ) -> Result<Self, UserValidationError> {
        if id.is_nil() {
            return Err(UserValidationError::EmptyId);
        }
        let name = name.into();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if created_on == DateTime::<Utc>::MIN_UTC {
            return Err(UserValidationError::MissingCreatedOn);
        }
        Ok(Self { id, name, created_on })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user() {
        let id = UserId::new();
        let now = Utc::now();
        let user = User::new(id, "Alice", now).unwrap();
        assert_eq!(user.id(), id);
        assert_eq!(user.name(), "Alice");
        assert_eq!(user.created_on(), now);
    }

    #[test]
    fn test_nil_id_is_rejected() {
        let result = User::new(UserId::from_uuid(Uuid::nil()), "Alice", Utc::now());
        assert_eq!(result, Err(UserValidationError::EmptyId));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let result = User::new(UserId::new(), "", Utc::now());
        assert_eq!(result, Err(UserValidationError::EmptyName));
    }

    #[test]
    fn test_minimum_timestamp_is_rejected() {
        let result = User::new(UserId::new(), "Alice", DateTime::<Utc>::MIN_UTC);
        assert_eq!(result, Err(UserValidationError::MissingCreatedOn));
    }

    #[test]
    fn test_user_id_round_trips_through_display() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}
