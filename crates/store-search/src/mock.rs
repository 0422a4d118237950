//! Canned store transport for tests.
//!
//! Only available in tests or with the `tests` feature enabled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;
use url::Url;

use crate::client::{StoreResponse, StoreTransport};
use crate::config::DEFAULT_STORE;
use crate::error::FetchError;

// Arc allows queueing replies from the test while the session owns a clone.
type MockField<T> = Arc<Mutex<T>>;

/// A transport replaying queued replies in order.
///
/// Every requested target is recorded. Once the queue is exhausted
/// further fetches fail with a transport error.
#[derive(Debug, Clone)]
pub struct MockClient {
    store_url: Url,
    replies: MockField<VecDeque<MockReply>>,
    requests: MockField<Vec<Url>>,
}

impl Default for MockClient {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE.clone(),
            replies: MockField::default(),
            requests: MockField::default(),
        }
    }
}

#[derive(Debug)]
struct MockReply {
    result: Result<StoreResponse, FetchError>,
    hold: Option<oneshot::Receiver<()>>,
}

/// Lets a held reply complete, see [`MockClient::push_held`].
#[derive(Debug)]
pub struct MockRelease(oneshot::Sender<()>);

impl MockRelease {
    pub fn release(self) {
        // The fetch may already have been dropped by a cancellation.
        let _ = self.0.send(());
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock reporting `store_url` as its endpoint.
    pub fn with_store_url(store_url: Url) -> Self {
        Self {
            store_url,
            ..Self::default()
        }
    }

    /// Queue a `200 OK` reply with a JSON body.
    pub fn push_json(&self, body: Value) {
        self.push_response(StoreResponse::ok(body.to_string()));
    }

    pub fn push_response(&self, response: StoreResponse) {
        self.push(Ok(response), None);
    }

    pub fn push_error(&self, error: FetchError) {
        self.push(Err(error), None);
    }

    /// Queue a reply that is only delivered after the returned handle
    /// is released.
    pub fn push_held(&self, response: StoreResponse) -> MockRelease {
        let (release, hold) = oneshot::channel();
        self.push(Ok(response), Some(hold));
        MockRelease(release)
    }

    /// All targets requested so far.
    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().expect("mock requests poisoned").clone()
    }

    fn push(&self, result: Result<StoreResponse, FetchError>, hold: Option<oneshot::Receiver<()>>) {
        self.replies
            .lock()
            .expect("mock replies poisoned")
            .push_back(MockReply { result, hold });
    }
}

impl StoreTransport for MockClient {
    fn store_url(&self) -> &Url {
        &self.store_url
    }

    async fn fetch(&self, target: Url) -> Result<StoreResponse, FetchError> {
        self.requests
            .lock()
            .expect("mock requests poisoned")
            .push(target);
        let reply = self
            .replies
            .lock()
            .expect("mock replies poisoned")
            .pop_front();

        let Some(reply) = reply else {
            return Err(FetchError::Transport("no mock reply queued".to_string()));
        };
        if let Some(hold) = reply.hold {
            // A dropped release handle delivers the reply as well.
            let _ = hold.await;
        }
        reply.result
    }
}
