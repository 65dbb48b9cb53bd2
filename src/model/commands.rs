use crate::domain::UserId;

/// Commands accepted by the user aggregate.
///
/// `limit` and `skip` are signed so a boundary can pass through whatever it
/// received; negative values yield an empty page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    CreateUser { id: UserId, name: String },
    DeleteUser { id: UserId },
    GetUser { id: UserId },
    GetUsers { limit: i64, skip: i64 },
}

impl UserCommand {
    /// The user this command targets, if any.
    pub fn target_id(&self) -> Option<UserId> {
        match self {
            UserCommand::CreateUser { id, .. }
            | UserCommand::DeleteUser { id }
            | UserCommand::GetUser { id } => Some(*id),
            UserCommand::GetUsers { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_id() {
        let id = UserId::new();
        assert_eq!(UserCommand::DeleteUser { id }.target_id(), Some(id));
        assert_eq!(UserCommand::GetUsers { limit: 1, skip: 0 }.target_id(), None);
    }
}
