use crate::clients::actor_client::ActorClient;
use crate::domain::{UserId, Users};
use crate::framework::{RequestContext, RouterClient};
use crate::model::{UserCommand, UserEvent};
use crate::user_actor::UserError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for interacting with the user aggregate through its router.
///
/// Every method answers with the aggregate's [`UserEvent`] reply. Only plumbing
/// failures (timeout, closed router) come back as [`UserError`].
#[derive(Clone)]
pub struct UserClient {
    inner: RouterClient<Users>,
    request_timeout: Duration,
    default_limit: i64,
    default_skip: i64,
}

impl UserClient {
    pub fn new(inner: RouterClient<Users>, request_timeout: Duration) -> Self {
        Self {
            inner,
            request_timeout,
            default_limit: 10,
            default_skip: 0,
        }
    }

    /// Page size and offset used by [`list_users`](Self::list_users) when none is given.
    pub fn with_page_defaults(mut self, limit: i64, skip: i64) -> Self {
        self.default_limit = limit;
        self.default_skip = skip;
        self
    }
}

#[async_trait]
impl ActorClient<Users> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &RouterClient<Users> {
        &self.inner
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl UserClient {
    /// Creates a user with a freshly generated id.
    #[instrument(skip(self, ctx))]
    pub async fn create_user(&self, name: &str, ctx: RequestContext) -> Result<UserEvent, UserError> {
        self.create_user_with_id(UserId::new(), name, ctx).await
    }

    /// Creates a user under a caller-chosen id. Repeating the call returns the existing user.
    #[instrument(skip(self, ctx))]
    pub async fn create_user_with_id(
        &self,
        id: UserId,
        name: &str,
        ctx: RequestContext,
    ) -> Result<UserEvent, UserError> {
        debug!("Sending request");
        self.ask(UserCommand::CreateUser { id, name: name.to_string() }, ctx)
            .await
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_user(&self, id: UserId, ctx: RequestContext) -> Result<UserEvent, UserError> {
        debug!("Sending request");
        self.ask(UserCommand::DeleteUser { id }, ctx).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_user(&self, id: UserId, ctx: RequestContext) -> Result<UserEvent, UserError> {
        debug!("Sending request");
        self.ask(UserCommand::GetUser { id }, ctx).await
    }

    /// Lists users newest first, falling back to the configured page defaults.
    #[instrument(skip(self, ctx))]
    pub async fn list_users(
        &self,
        limit: Option<i64>,
        skip: Option<i64>,
        ctx: RequestContext,
    ) -> Result<UserEvent, UserError> {
        let limit = limit.unwrap_or(self.default_limit);
        let skip = skip.unwrap_or(self.default_skip);
        debug!(limit, skip, "Sending request");
        self.ask(UserCommand::GetUsers { limit, skip }, ctx).await
    }
}
