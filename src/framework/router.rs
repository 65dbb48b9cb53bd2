//! # Request Router
//!
//! The `Router` is the single entry point callers talk to. It forwards each command to the
//! aggregate processor, creating that processor the first time it is needed, and relays the
//! reply back with a deadline.
//!
//! # Architecture Note
//! The router hands commands to the processor in the order they arrived, but it never waits
//! for a reply itself. Each pending reply is relayed by a detached task, so a slow command
//! cannot hold up the requests queued behind it.

use crate::framework::aggregate::Aggregate;
use crate::framework::client::AggregateClient;
use crate::framework::context::RequestContext;
use crate::framework::error::FrameworkError;
use crate::framework::message::RouterRequest;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// Builds the processor on first use.
pub type ProcessorFactory<A> = Box<dyn FnMut() -> AggregateClient<A> + Send>;

pub struct Router<A: Aggregate> {
    receiver: mpsc::Receiver<RouterRequest<A>>,
    factory: ProcessorFactory<A>,
    child: Option<AggregateClient<A>>,
}

impl<A: Aggregate> Router<A> {
    pub fn new(
        buffer_size: usize,
        factory: impl FnMut() -> AggregateClient<A> + Send + 'static,
    ) -> (Self, RouterClient<A>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let router = Self {
            receiver,
            factory: Box::new(factory),
            child: None,
        };
        (router, RouterClient::new(sender))
    }

    pub async fn run(mut self) {
        info!(aggregate = A::NAME, "Router started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                RouterRequest::Forward {
                    cmd,
                    ctx,
                    timeout,
                    respond_to,
                } => {
                    let deadline = Instant::now() + timeout;
                    self.forward(cmd, ctx, timeout, deadline, respond_to).await;
                }
            }
        }

        info!(aggregate = A::NAME, "Router shutdown");
    }

    fn child(&mut self) -> AggregateClient<A> {
        match &self.child {
            Some(child) if !child.is_closed() => child.clone(),
            _ => {
                debug!(aggregate = A::NAME, "Creating processor");
                let child = (self.factory)();
                self.child = Some(child.clone());
                child
            }
        }
    }

    async fn forward(
        &mut self,
        cmd: A::Command,
        ctx: RequestContext,
        timeout: Duration,
        deadline: Instant,
        respond_to: oneshot::Sender<Result<A::Reply, FrameworkError>>,
    ) {
        let child = self.child();

        let pending = match timeout_at(deadline, child.dispatch(cmd, ctx)).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => {
                warn!(aggregate = A::NAME, error = %e, "Processor unavailable");
                self.child = None;
                let _ = respond_to.send(Err(e));
                return;
            }
            Err(_) => {
                warn!(aggregate = A::NAME, ?timeout, "Processor mailbox full until deadline");
                let _ = respond_to.send(Err(FrameworkError::Timeout { after: timeout }));
                return;
            }
        };

        tokio::spawn(relay::<A>(pending, deadline, timeout, respond_to));
    }
}

async fn relay<A: Aggregate>(
    pending: oneshot::Receiver<A::Reply>,
    deadline: Instant,
    timeout: Duration,
    respond_to: oneshot::Sender<Result<A::Reply, FrameworkError>>,
) {
    let result = match timeout_at(deadline, pending).await {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(_)) => Err(FrameworkError::ActorDropped),
        Err(_) => {
            warn!(aggregate = A::NAME, ?timeout, "Request timed out");
            Err(FrameworkError::Timeout { after: timeout })
        }
    };

    if let Err(result) = respond_to.send(result) {
        warn!(aggregate = A::NAME, ?result, "Dead letter: caller gone");
    }
}

/// Caller-side handle of a [`Router`].
#[derive(Clone)]
pub struct RouterClient<A: Aggregate> {
    sender: mpsc::Sender<RouterRequest<A>>,
}

impl<A: Aggregate> RouterClient<A> {
    pub fn new(sender: mpsc::Sender<RouterRequest<A>>) -> Self {
        Self { sender }
    }

    /// Sends a command through the router and waits at most `timeout` for the reply.
    pub async fn ask(
        &self,
        cmd: A::Command,
        ctx: RequestContext,
        timeout: Duration,
    ) -> Result<A::Reply, FrameworkError> {
        let request = async {
            let (respond_to, response) = oneshot::channel();
            self.sender
                .send(RouterRequest::Forward {
                    cmd,
                    ctx,
                    timeout,
                    respond_to,
                })
                .await
                .map_err(|_| FrameworkError::ActorClosed)?;
            response.await.map_err(|_| FrameworkError::ActorDropped)?
        };

        tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| FrameworkError::Timeout { after: timeout })?
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, Users};
    use crate::framework::mock::{create_mock_client, expect_execute, MockClient};
    use crate::model::{UserCommand, UserEvent, UserNotFound};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn spawn_router(client: AggregateClient<Users>, created: Arc<AtomicUsize>) -> RouterClient<Users> {
        let (router, router_client) = Router::new(8, move || {
            created.fetch_add(1, Ordering::SeqCst);
            client.clone()
        });
        tokio::spawn(router.run());
        router_client
    }

    #[tokio::test]
    async fn test_router_relays_reply() {
        let (client, mut receiver) = create_mock_client::<Users>(8);
        let created = Arc::new(AtomicUsize::new(0));
        let router = spawn_router(client, created.clone());
        let id = UserId::new();

        let ask = tokio::spawn(async move {
            router
                .ask(UserCommand::GetUser { id }, RequestContext::default(), Duration::from_secs(1))
                .await
        });

        let (cmd, _ctx, respond_to) = expect_execute(&mut receiver)
            .await
            .expect("Expected Execute request");
        assert_eq!(cmd, UserCommand::GetUser { id });
        respond_to
            .send(UserEvent::UserNotFound(UserNotFound { id }))
            .unwrap();

        let reply = ask.await.unwrap().unwrap();
        assert_eq!(reply, UserEvent::UserNotFound(UserNotFound { id }));
    }

    #[tokio::test]
    async fn test_router_creates_processor_once() {
        let mut mock = MockClient::<Users>::new();
        let id = UserId::new();
        mock.expect_execute().return_ok(UserEvent::UserNotFound(UserNotFound { id }));
        mock.expect_execute().return_ok(UserEvent::UserNotFound(UserNotFound { id }));

        let created = Arc::new(AtomicUsize::new(0));
        let router = spawn_router(mock.client(), created.clone());
        assert_eq!(created.load(Ordering::SeqCst), 0);

        for _ in 0..2 {
            router
                .ask(UserCommand::GetUser { id }, RequestContext::default(), Duration::from_secs(1))
                .await
                .unwrap();
        }

        assert_eq!(created.load(Ordering::SeqCst), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn test_router_times_out_when_processor_never_replies() {
        let mut mock = MockClient::<Users>::new();
        mock.expect_execute().never_reply();

        let router = spawn_router(mock.client(), Arc::new(AtomicUsize::new(0)));
        let timeout = Duration::from_millis(50);

        let result = router
            .ask(UserCommand::GetUsers { limit: 10, skip: 0 }, RequestContext::default(), timeout)
            .await;

        assert_eq!(result, Err(FrameworkError::Timeout { after: timeout }));
    }

    #[tokio::test]
    async fn test_slow_reply_does_not_block_next_request() {
        let mut mock = MockClient::<Users>::new();
        let id = UserId::new();
        mock.expect_execute().never_reply();
        mock.expect_execute().return_ok(UserEvent::UserNotFound(UserNotFound { id }));

        let router = spawn_router(mock.client(), Arc::new(AtomicUsize::new(0)));

        let slow = {
            let router = router.clone();
            tokio::spawn(async move {
                router
                    .ask(UserCommand::GetUsers { limit: 10, skip: 0 }, RequestContext::default(), Duration::from_millis(300))
                    .await
            })
        };
        // Let the slow request reach the mock first.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = router
            .ask(UserCommand::GetUser { id }, RequestContext::default(), Duration::from_millis(100))
            .await;

        assert_eq!(fast, Ok(UserEvent::UserNotFound(UserNotFound { id })));
        assert!(matches!(slow.await.unwrap(), Err(FrameworkError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_router_reports_dropped_reply() {
        let (client, mut receiver) = create_mock_client::<Users>(8);
        let router = spawn_router(client, Arc::new(AtomicUsize::new(0)));
        let id = UserId::new();

        let ask = tokio::spawn(async move {
            router
                .ask(UserCommand::DeleteUser { id }, RequestContext::default(), Duration::from_secs(1))
                .await
        });

        let (_cmd, _ctx, respond_to) = expect_execute(&mut receiver).await.unwrap();
        drop(respond_to);

        assert_eq!(ask.await.unwrap(), Err(FrameworkError::ActorDropped));
    }

    #[tokio::test]
    async fn test_late_reply_to_gone_caller_is_dropped() {
        let (client, mut receiver) = create_mock_client::<Users>(8);
        let router = spawn_router(client, Arc::new(AtomicUsize::new(0)));
        let id = UserId::new();

        let abandoned = {
            let router = router.clone();
            tokio::spawn(async move {
                router
                    .ask(UserCommand::GetUser { id }, RequestContext::default(), Duration::from_secs(1))
                    .await
            })
        };
        let (_cmd, _ctx, late) = expect_execute(&mut receiver).await.unwrap();
        abandoned.abort();
        assert!(abandoned.await.unwrap_err().is_cancelled());

        // Accepted by the relay, then logged as a dead letter.
        late.send(UserEvent::UserNotFound(UserNotFound { id })).unwrap();

        let next = tokio::spawn(async move {
            router
                .ask(UserCommand::GetUser { id }, RequestContext::default(), Duration::from_secs(1))
                .await
        });
        let (_cmd, _ctx, respond_to) = expect_execute(&mut receiver).await.unwrap();
        respond_to.send(UserEvent::UserNotFound(UserNotFound { id })).unwrap();

        assert_eq!(next.await.unwrap(), Ok(UserEvent::UserNotFound(UserNotFound { id })));
    }
}
