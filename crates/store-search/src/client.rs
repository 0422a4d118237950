//! HTTP access to the store search endpoint.

use std::fmt::Debug;
use std::future::Future;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap};
use tracing::{debug, instrument};
use url::Url;

use crate::config::StoreSearchConfig;
use crate::error::{FetchError, StoreClientError};

/// A response as delivered by a [`StoreTransport`].
///
/// Status classification is left to the caller so every transport is
/// judged by the same rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResponse {
    pub status: u16,
    pub body: Bytes,
}

impl StoreResponse {
    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

// ---------------------------------------------------------------------------
// Transport trait
// ---------------------------------------------------------------------------

/// Performs a single GET of a search target.
///
/// This trait enables alternate implementations:
/// - **HTTP**: [`StoreClient`]
/// - **Mock** (tests): canned responses without HTTP, see `MockClient`
///
/// Implementations perform exactly one attempt and no retries. Dropping the
/// returned future must abort the request.
pub trait StoreTransport: Send + Sync + 'static {
    /// The search endpoint targets are built from.
    fn store_url(&self) -> &Url;

    fn fetch(&self, target: Url) -> impl Future<Output = Result<StoreResponse, FetchError>> + Send;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// A client for the store's search endpoint.
pub struct StoreClient {
    client: reqwest::Client,
    config: StoreSearchConfig,
}

impl Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("store_url", &self.config.store_url.as_str())
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    /// Create a new store client from configuration.
    pub fn new(config: StoreSearchConfig) -> Result<Self, StoreClientError> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    /// The underlying HTTP client, shared with other store requests
    /// such as artwork downloads.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl StoreTransport for StoreClient {
    fn store_url(&self) -> &Url {
        &self.config.store_url
    }

    #[instrument(skip_all, fields(target = %target))]
    async fn fetch(&self, target: Url) -> Result<StoreResponse, FetchError> {
        debug!("sending store request");
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        // The status line arrived, anything going wrong from here on
        // means the response itself is broken.
        let body = response.bytes().await.map_err(|err| {
            debug!(%err, status, "failed to read store response body");
            FetchError::InvalidResponse
        })?;

        debug!(status, bytes = body.len(), "received store response");
        Ok(StoreResponse { status, body })
    }
}

/// Build an HTTP client that sends the configured headers with every request.
fn build_http_client(config: &StoreSearchConfig) -> Result<reqwest::Client, StoreClientError> {
    let mut headers = HeaderMap::new();

    for (key, value) in &config.extra_headers {
        let invalid = |source: Box<dyn std::error::Error + Send + Sync>| {
            StoreClientError::InvalidHeader {
                name: key.clone(),
                source,
            }
        };
        headers.insert(
            header::HeaderName::from_str(key).map_err(|e| invalid(e.into()))?,
            header::HeaderValue::from_str(value).map_err(|e| invalid(e.into()))?,
        );
    }

    debug!(
        store_url = %config.store_url,
        extra_headers = config.extra_headers.len(),
        "building store HTTP client"
    );

    let client_builder = reqwest::Client::builder().default_headers(headers);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder.build().map_err(StoreClientError::Build)
}

#[cfg(test)]
pub mod tests {
    use std::collections::BTreeMap;

    use httpmock::MockServer;
    use serde_json::json;

    use super::*;
    use crate::query::build_target;
    use crate::types::Category;

    fn client_for(server: &MockServer) -> StoreClient {
        let store_url = Url::parse(&server.url("/search")).unwrap();
        StoreClient::new(StoreSearchConfig::with_store_url(store_url)).unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_status_and_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/search")
                .query_param("term", "rock & roll")
                .query_param("limit", "200")
                .query_param("entity", "musicTrack");
            then.status(200).json_body(json!({ "results": [] }));
        });

        let client = client_for(&server);
        let target = build_target(client.store_url(), "rock & roll", Category::Music);
        let response = client.fetch(target).await.unwrap();

        mock.assert();
        assert!(response.is_success());
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body, json!({ "results": [] }));
    }

    #[tokio::test]
    async fn non_success_status_is_passed_through() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(404).body("not here");
        });

        let client = client_for(&server);
        let response = client
            .fetch(build_target(client.store_url(), "abba", Category::All))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        // Nothing listens on port 1.
        let store_url = Url::parse("http://127.0.0.1:1/search").unwrap();
        let client = StoreClient::new(StoreSearchConfig::with_store_url(store_url)).unwrap();

        let result = client
            .fetch(build_target(client.store_url(), "abba", Category::All))
            .await;
        assert!(
            matches!(result, Err(FetchError::Transport(ref message)) if !message.is_empty()),
            "expected transport error, found: {result:?}"
        );
    }

    #[tokio::test]
    async fn extra_headers_and_user_agent_set_on_requests() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("x-client", "tests")
                .header("user-agent", "store-search-tests");
            then.status(200).json_body(json!({ "results": [] }));
        });

        let config = StoreSearchConfig {
            user_agent: Some("store-search-tests".to_string()),
            extra_headers: BTreeMap::from([("x-client".to_string(), "tests".to_string())]),
            ..StoreSearchConfig::with_store_url(Url::parse(&server.url("/search")).unwrap())
        };
        let client = StoreClient::new(config).unwrap();
        let _ = client
            .fetch(build_target(client.store_url(), "abba", Category::All))
            .await;
        mock.assert();
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let config = StoreSearchConfig {
            extra_headers: BTreeMap::from([("not a header".to_string(), "x".to_string())]),
            ..Default::default()
        };
        let err = StoreClient::new(config).unwrap_err();
        assert!(
            matches!(err, StoreClientError::InvalidHeader { ref name, .. } if name == "not a header"),
            "{err:?}"
        );
    }
}
