use crate::domain::{User, UserId, UserValidationError};
use crate::model::{
    DomainEvent, UserCreated, UserDeleted, UserEvent, UserNotFound, UserRetrieved, UsersRetrieved,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// The whole user collection, treated as a single aggregate.
///
/// All operations answer with a [`UserEvent`]. Missing users are reported as
/// [`UserEvent::UserNotFound`], never as errors; the only `Err` is a
/// [`UserValidationError`], which callers treat as a fault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Users {
    state: HashMap<UserId, User>,
}

impl Users {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the user unless one with the same id already exists.
    ///
    /// Creation is idempotent by id: for a known id the existing record is
    /// returned as [`UserEvent::UserRetrieved`] and `name` is ignored.
    /// `created_on` defaults to now; replay passes the recorded value.
    pub fn create_user(
        &mut self,
        id: UserId,
        name: &str,
        created_on: Option<DateTime<Utc>>,
    ) -> Result<UserEvent, UserValidationError> {
        match self.state.entry(id) {
            Entry::Occupied(existing) => Ok(UserEvent::UserRetrieved(existing.get().into())),
            Entry::Vacant(slot) => {
                let user = User::new(id, name, created_on.unwrap_or_else(Utc::now))?;
                let created = UserCreated::from(&user);
                slot.insert(user);
                Ok(UserEvent::UserCreated(created))
            }
        }
    }

    /// Hard-deletes the user.
    pub fn delete_user(&mut self, id: UserId) -> UserEvent {
        match self.state.remove(&id) {
            Some(_) => UserEvent::UserDeleted(UserDeleted { id }),
            None => UserEvent::UserNotFound(UserNotFound { id }),
        }
    }

    pub fn get_user_by_id(&self, id: UserId) -> UserEvent {
        match self.state.get(&id) {
            Some(user) => UserEvent::UserRetrieved(user.into()),
            None => UserEvent::UserNotFound(UserNotFound { id }),
        }
    }

    /// Returns one page of users, newest first.
    ///
    /// A negative `limit` or `skip` selects nothing; `total_count` always
    /// reports the size of the whole collection.
    pub fn get_all_users(&self, limit: i64, skip: i64) -> UserEvent {
        let total_count = self.state.len();
        if limit <= 0 || skip < 0 {
            return UserEvent::UsersRetrieved(UsersRetrieved { total_count, users: Vec::new() });
        }
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);

        let mut sorted: Vec<&User> = self.state.values().collect();
        sorted.sort_by(|a, b| {
            b.created_on()
                .cmp(&a.created_on())
                .then_with(|| a.id().cmp(&b.id()))
        });

        let users = sorted
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(UserRetrieved::from)
            .collect();

        UserEvent::UsersRetrieved(UsersRetrieved { total_count, users })
    }

    /// Folds a persisted event into the state, keeping its original timestamp.
    pub fn apply_event(&mut self, event: &DomainEvent) -> Result<(), UserValidationError> {
        match event {
            DomainEvent::UserCreated(e) => {
                self.create_user(e.id, &e.name, Some(e.created_on))?;
            }
            DomainEvent::UserDeleted(e) => {
                self.delete_user(e.id);
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.state.get(id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.state.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl FromIterator<User> for Users {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        Self {
            state: iter.into_iter().map(|u| (u.id(), u)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seeded(count: usize) -> (Users, Vec<User>) {
        let base = Utc::now();
        let users: Vec<User> = (0..count)
            .map(|i| {
                User::new(UserId::new(), format!("user{i}"), base + Duration::seconds(i as i64))
                    .unwrap()
            })
            .collect();
        (users.iter().cloned().collect(), users)
    }

    #[test]
    fn test_new_state_is_empty() {
        assert!(Users::new().is_empty());
    }

    #[test]
    fn test_get_unknown_user_returns_not_found() {
        let id = UserId::new();
        let result = Users::new().get_user_by_id(id);
        assert_eq!(result, UserEvent::UserNotFound(UserNotFound { id }));
    }

    #[test]
    fn test_get_existing_user_returns_user() {
        let (users, seeded) = seeded(3);
        let existing = &seeded[0];
        match users.get_user_by_id(existing.id()) {
            UserEvent::UserRetrieved(u) => {
                assert_eq!(u.id, existing.id());
                assert_eq!(u.name, existing.name());
                assert_eq!(u.created_on, existing.created_on());
            }
            other => panic!("expected UserRetrieved, got {other:?}"),
        }
    }

    #[test]
    fn test_create_user_inserts_new_user() {
        let mut users = Users::new();
        let id = UserId::new();
        let result = users.create_user(id, "Alice", None).unwrap();
        assert!(matches!(result, UserEvent::UserCreated(ref e) if e.id == id && e.name == "Alice"));
        assert!(users.contains(&id));
    }

    #[test]
    fn test_create_user_is_idempotent_by_id() {
        let mut users = Users::new();
        let id = UserId::new();
        users.create_user(id, "Alice", None).unwrap();

        let second = users.create_user(id, "Bob", None).unwrap();
        match second {
            UserEvent::UserRetrieved(u) => assert_eq!(u.name, "Alice"),
            other => panic!("expected UserRetrieved, got {other:?}"),
        }
        assert_eq!(users.len(), 1);
        assert_eq!(users.get(&id).map(User::name), Some("Alice"));
    }

    #[test]
    fn test_create_user_uses_supplied_timestamp() {
        let mut users = Users::new();
        let id = UserId::new();
        let at = Utc::now() - Duration::days(3);
        users.create_user(id, "Alice", Some(at)).unwrap();
        assert_eq!(users.get(&id).map(User::created_on), Some(at));
    }

    #[test]
    fn test_create_user_with_empty_name_fails_validation() {
        let mut users = Users::new();
        let result = users.create_user(UserId::new(), "", None);
        assert_eq!(result, Err(UserValidationError::EmptyName));
        assert!(users.is_empty());
    }

    #[test]
    fn test_delete_unknown_user_returns_not_found() {
        let id = UserId::new();
        let result = Users::new().delete_user(id);
        assert_eq!(result, UserEvent::UserNotFound(UserNotFound { id }));
    }

    #[test]
    fn test_delete_existing_user_removes_it() {
        let (mut users, seeded) = seeded(3);
        let id = seeded[1].id();
        assert_eq!(users.delete_user(id), UserEvent::UserDeleted(UserDeleted { id }));
        assert_eq!(users.get_user_by_id(id), UserEvent::UserNotFound(UserNotFound { id }));
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn test_get_all_users_on_empty_state() {
        let result = Users::new().get_all_users(10, 0);
        assert_eq!(
            result,
            UserEvent::UsersRetrieved(UsersRetrieved { total_count: 0, users: vec![] })
        );
    }

    #[test]
    fn test_get_all_users_orders_newest_first() {
        let (users, seeded) = seeded(10);
        let UserEvent::UsersRetrieved(page) = users.get_all_users(100, 0) else {
            panic!("expected UsersRetrieved");
        };
        assert_eq!(page.total_count, 10);
        assert_eq!(page.users.len(), 10);
        let expected: Vec<UserId> = seeded.iter().rev().map(User::id).collect();
        let actual: Vec<UserId> = page.users.iter().map(|u| u.id).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_get_all_users_skips_and_limits() {
        let (users, seeded) = seeded(10);
        let UserEvent::UsersRetrieved(page) = users.get_all_users(5, 7) else {
            panic!("expected UsersRetrieved");
        };
        assert_eq!(page.total_count, 10);
        assert_eq!(page.users.len(), 3);
        assert_eq!(page.users[0].id, seeded[2].id());
    }

    #[test]
    fn test_get_all_users_clamps_negative_arguments() {
        let (users, _) = seeded(4);
        for (limit, skip) in [(-1, 0), (5, -1), (0, 0)] {
            let UserEvent::UsersRetrieved(page) = users.get_all_users(limit, skip) else {
                panic!("expected UsersRetrieved");
            };
            assert_eq!(page.total_count, 4);
            assert!(page.users.is_empty(), "limit={limit} skip={skip}");
        }
    }

    #[test]
    fn test_apply_replays_events() {
        let mut users = Users::new();
        let id = UserId::new();
        let at = Utc::now() - Duration::hours(1);
        users
            .apply_event(&DomainEvent::UserCreated(UserCreated { id, name: "Alice".into(), created_on: at }))
            .unwrap();
        assert_eq!(users.get(&id).map(User::created_on), Some(at));

        users.apply_event(&DomainEvent::UserDeleted(UserDeleted { id })).unwrap();
        assert!(!users.contains(&id));
    }
}
