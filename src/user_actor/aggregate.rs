//! Aggregate trait implementation for the user collection.
//!
//! This module contains the [`Aggregate`] implementation that enables [`Users`] to be driven
//! by the generic [`crate::framework::AggregateActor`].

use crate::domain::{UserId, UserValidationError, Users};
use crate::framework::{Aggregate, ChaosType, RequestContext};
use crate::model::{DomainEvent, UnexpectedErrorOccurred, UserCommand, UserEvent};
use uuid::Uuid;

impl Aggregate for Users {
    const NAME: &'static str = "Users";

    type Command = UserCommand;
    type Reply = UserEvent;
    type Event = DomainEvent;
    type Error = UserValidationError;

    fn handle(&mut self, cmd: &UserCommand) -> Result<UserEvent, UserValidationError> {
        match cmd {
            UserCommand::CreateUser { id, name } => self.create_user(*id, name, None),
            UserCommand::DeleteUser { id } => Ok(self.delete_user(*id)),
            UserCommand::GetUser { id } => Ok(self.get_user_by_id(*id)),
            UserCommand::GetUsers { limit, skip } => Ok(self.get_all_users(*limit, *skip)),
        }
    }

    fn apply(&mut self, event: &DomainEvent) -> Result<(), UserValidationError> {
        self.apply_event(event)
    }

    fn event_for(reply: &UserEvent) -> Option<DomainEvent> {
        reply.to_domain_event()
    }

    /// Reports the failure against the targeted user, or the nil id for list queries.
    fn failure_reply(cmd: &UserCommand) -> UserEvent {
        UserEvent::UnexpectedErrorOccurred(UnexpectedErrorOccurred {
            id: cmd
                .target_id()
                .unwrap_or_else(|| UserId::from_uuid(Uuid::nil())),
        })
    }

    /// `create-user-down` fails every create in the request as if the store were unreachable.
    fn should_crash(cmd: &UserCommand, ctx: &RequestContext) -> bool {
        matches!(cmd, UserCommand::CreateUser { .. }) && ctx.has_chaos(ChaosType::CreateUserDown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UserCreated, UserDeleted};

    #[test]
    fn test_only_state_changes_become_events() {
        let mut users = Users::new();
        let id = UserId::new();

        let created = users
            .handle(&UserCommand::CreateUser { id, name: "Ada".into() })
            .unwrap();
        assert!(matches!(Users::event_for(&created), Some(DomainEvent::UserCreated(UserCreated { id: e, .. })) if e == id));

        let again = users
            .handle(&UserCommand::CreateUser { id, name: "Other".into() })
            .unwrap();
        assert!(matches!(again, UserEvent::UserRetrieved(_)));
        assert_eq!(Users::event_for(&again), None);

        let fetched = users.handle(&UserCommand::GetUser { id }).unwrap();
        assert_eq!(Users::event_for(&fetched), None);

        let deleted = users.handle(&UserCommand::DeleteUser { id }).unwrap();
        assert_eq!(
            Users::event_for(&deleted),
            Some(DomainEvent::UserDeleted(UserDeleted { id }))
        );
    }

    #[test]
    fn test_empty_name_is_a_fault() {
        let mut users = Users::new();
        let result = users.handle(&UserCommand::CreateUser { id: UserId::new(), name: String::new() });
        assert_eq!(result, Err(UserValidationError::EmptyName));
        assert!(users.is_empty());
    }

    #[test]
    fn test_chaos_only_hits_create() {
        let ctx = RequestContext::default().with_chaos(ChaosType::CreateUserDown);
        let id = UserId::new();

        assert!(Users::should_crash(&UserCommand::CreateUser { id, name: "Ada".into() }, &ctx));
        assert!(!Users::should_crash(&UserCommand::DeleteUser { id }, &ctx));
        assert!(!Users::should_crash(&UserCommand::GetUsers { limit: 1, skip: 0 }, &ctx));
        assert!(!Users::should_crash(
            &UserCommand::CreateUser { id, name: "Ada".into() },
            &RequestContext::default()
        ));
    }

    #[test]
    fn test_failure_reply_targets_command_id() {
        let id = UserId::new();
        assert_eq!(
            Users::failure_reply(&UserCommand::CreateUser { id, name: "Ada".into() }),
            UserEvent::UnexpectedErrorOccurred(UnexpectedErrorOccurred { id })
        );
        match Users::failure_reply(&UserCommand::GetUsers { limit: 1, skip: 0 }) {
            UserEvent::UnexpectedErrorOccurred(e) => assert!(e.id.is_nil()),
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
