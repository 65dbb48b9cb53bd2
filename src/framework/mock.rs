//! # Mock Framework
//!
//! Utilities for testing routers and clients without a real processor.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then [`expect_execute`] to
//! take requests off the receiver and answer them by hand. [`MockClient`] does the same
//! with a fluent, queued expectation API.

use crate::framework::aggregate::Aggregate;
use crate::framework::client::AggregateClient;
use crate::framework::context::RequestContext;
use crate::framework::message::AggregateRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Expectation<A: Aggregate> {
    Reply(A::Reply),
    /// Keep the responder alive without answering, as a hung processor would.
    NeverReply,
}

type Expectations<A> = Arc<Mutex<VecDeque<Expectation<A>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A mock processor with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mut mock = MockClient::<Users>::new();
/// mock.expect_execute().return_ok(UserEvent::UserNotFound(UserNotFound { id }));
/// mock.expect_execute().never_reply();
///
/// let client = mock.client();
/// // Use client in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockClient<A: Aggregate> {
    client: AggregateClient<A>,
    expectations: Expectations<A>,
    received: Arc<Mutex<Vec<String>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<A: Aggregate> MockClient<A> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<AggregateRequest<A>>(100);
        let expectations: Expectations<A> = Arc::new(Mutex::new(VecDeque::new()));
        let received = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let received_clone = received.clone();

        let handle = tokio::spawn(async move {
            let mut hung: Vec<oneshot::Sender<A::Reply>> = Vec::new();

            while let Some(request) = receiver.recv().await {
                let expectation = lock(&expectations_clone).pop_front();

                match (request, expectation) {
                    (AggregateRequest::Execute { cmd, respond_to, .. }, Some(Expectation::Reply(reply))) => {
                        lock(&received_clone).push(format!("{cmd:?}"));
                        let _ = respond_to.send(reply);
                    }
                    (AggregateRequest::Execute { cmd, respond_to, .. }, Some(Expectation::NeverReply)) => {
                        lock(&received_clone).push(format!("{cmd:?}"));
                        hung.push(respond_to);
                    }
                    (AggregateRequest::Execute { cmd, .. }, None) => {
                        panic!("Unexpected request: {cmd:?}");
                    }
                }
            }
        });

        Self {
            client: AggregateClient::new(sender),
            expectations,
            received,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> AggregateClient<A> {
        self.client.clone()
    }

    /// Expects one `execute` request.
    pub fn expect_execute(&mut self) -> ExecuteExpectationBuilder<A> {
        ExecuteExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Debug renderings of every command received so far.
    pub fn received(&self) -> Vec<String> {
        lock(&self.received).clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = lock(&self.expectations);
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl<A: Aggregate> Default for MockClient<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `execute` expectations.
pub struct ExecuteExpectationBuilder<A: Aggregate> {
    expectations: Expectations<A>,
}

impl<A: Aggregate> ExecuteExpectationBuilder<A> {
    /// Answers the request with `reply`.
    pub fn return_ok(self, reply: A::Reply) {
        lock(&self.expectations).push_back(Expectation::Reply(reply));
    }

    /// Accepts the request and never answers it.
    pub fn never_reply(self) {
        lock(&self.expectations).push_back(Expectation::NeverReply);
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// To test the router or a typed client we don't need a real `AggregateActor`. The mock
/// client sends into a channel we control, so the test can inspect every command and
/// decide how (or whether) to answer it.
///
/// **Note**: Consider using [`MockClient`] for a more fluent API.
pub fn create_mock_client<A: Aggregate>(
    buffer_size: usize,
) -> (AggregateClient<A>, mpsc::Receiver<AggregateRequest<A>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (AggregateClient::new(sender), receiver)
}

/// Helper to take the next Execute request off the receiver.
pub async fn expect_execute<A: Aggregate>(
    receiver: &mut mpsc::Receiver<AggregateRequest<A>>,
) -> Option<(A::Command, RequestContext, oneshot::Sender<A::Reply>)> {
    match receiver.recv().await {
        Some(AggregateRequest::Execute { cmd, ctx, respond_to }) => Some((cmd, ctx, respond_to)),
        None => None,
    }
}
