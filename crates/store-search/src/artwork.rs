//! Artwork downloads for result rows.
//!
//! Each row owns the [`ArtworkRequest`] for its thumbnail. Recycling a row
//! drops or cancels its request, which aborts the download.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, trace};
use url::Url;

use crate::error::FetchError;

/// Retrieves image bytes for a URL.
pub trait ArtworkFetcher: Send + Sync + 'static {
    fn fetch_artwork(&self, url: Url) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

/// Downloads artwork over HTTP.
#[derive(Debug, Clone)]
pub struct HttpArtworkFetcher {
    client: reqwest::Client,
}

impl HttpArtworkFetcher {
    /// Usually shares the client of [`crate::StoreClient::http_client`].
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ArtworkFetcher for HttpArtworkFetcher {
    async fn fetch_artwork(&self, url: Url) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        response
            .bytes()
            .await
            .map_err(|_| FetchError::InvalidResponse)
    }
}

/// Starts independently cancellable artwork downloads.
#[derive(Debug)]
pub struct ArtworkLoader<F> {
    fetcher: Arc<F>,
}

impl<F> Clone for ArtworkLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F: ArtworkFetcher> ArtworkLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }

    /// Start downloading `url` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn load(&self, url: Url) -> ArtworkRequest {
        let cancel = CancellationToken::new();
        let (result_tx, result_rx) = oneshot::channel();
        let fetcher = Arc::clone(&self.fetcher);
        let token = cancel.clone();

        debug!(%url, "loading artwork");
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => trace!(%url, "artwork download cancelled"),
                result = fetcher.fetch_artwork(url.clone()) => {
                    let _ = result_tx.send(result);
                },
            }
        });

        ArtworkRequest {
            token: cancel.clone(),
            result: result_rx,
            _guard: cancel.drop_guard(),
        }
    }
}

/// Handle to one artwork download. Dropping it cancels the download.
#[derive(Debug)]
pub struct ArtworkRequest {
    token: CancellationToken,
    result: oneshot::Receiver<Result<Bytes, FetchError>>,
    _guard: DropGuard,
}

impl ArtworkRequest {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for the download.
    ///
    /// Returns `None` if the request was cancelled before it finished.
    pub async fn wait(self) -> Option<Result<Bytes, FetchError>> {
        let Self {
            token,
            result,
            _guard,
        } = self;
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = result => result.ok(),
        }
    }
}
