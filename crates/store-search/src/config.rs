//! Configuration for store client and session construction.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Deserialize;
use url::Url;

/// Public search endpoint of the store.
pub const DEFAULT_STORE_URL: &str = "https://itunes.apple.com/search";

pub(crate) static DEFAULT_STORE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_STORE_URL).expect("default store url is valid"));

/// Configuration supplied by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StoreSearchConfig {
    /// Search endpoint, queries are appended to it.
    pub store_url: Url,
    /// Optional `User-Agent` sent with every request.
    pub user_agent: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for StoreSearchConfig {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE.clone(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
        }
    }
}

impl StoreSearchConfig {
    /// A default configuration pointing at another endpoint.
    pub fn with_store_url(store_url: Url) -> Self {
        Self {
            store_url,
            ..Default::default()
        }
    }
}
