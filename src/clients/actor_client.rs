use crate::framework::{Aggregate, FrameworkError, RequestContext, RouterClient};
use async_trait::async_trait;
use std::time::Duration;

/// Trait for aggregate-specific clients to inherit the deadline-bound ask.
///
/// Implementors supply the router handle, the timeout to apply and the error mapping;
/// typed methods then build commands and call [`ActorClient::ask`].
#[async_trait]
pub trait ActorClient<A: Aggregate>: Send + Sync {
    /// The aggregate-specific error type.
    type Error: From<FrameworkError> + Send + Sync;

    /// Access the inner generic RouterClient.
    fn inner(&self) -> &RouterClient<A>;

    /// Deadline for every request sent through this client.
    fn request_timeout(&self) -> Duration;

    /// Send a command and wait for its reply.
    #[tracing::instrument(name = "user_request", skip(self, ctx), fields(aggregate = A::NAME))]
    async fn ask(&self, cmd: A::Command, ctx: RequestContext) -> Result<A::Reply, Self::Error> {
        tracing::debug!("Sending request");
        self.inner()
            .ask(cmd, ctx, self.request_timeout())
            .await
            .map_err(Self::Error::from)
    }
}
