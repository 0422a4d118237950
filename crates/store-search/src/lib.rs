//! Free-text catalog searches against a remote store.
//!
//! This crate provides:
//! - Building search requests from a term and a [`Category`]
//! - Parsing the store's heterogeneous results into [`ResultRecord`]s
//! - A [`SearchSession`] that owns the single in-flight request, cancels
//!   superseded ones and exposes the search state to a presentation layer
//! - Independently cancellable artwork downloads for result rows
//!
//! ## Usage
//!
//! ```ignore
//! use store_search::{Category, SearchSession, StoreClient, StoreSearchConfig};
//!
//! let config = StoreSearchConfig::default();
//! let client = StoreClient::new(config)?;
//! let (mut session, mut events) = SearchSession::new(client);
//!
//! session.start_search("abbey road", Category::Music);
//! loop {
//!     tokio::select! {
//!         _ = session.next_completion() => {},
//!         Some(event) = events.recv() => render(event),
//!     }
//! }
//! ```

mod artwork;
mod client;
mod config;
mod error;
mod logger;
mod parser;
mod query;
mod rows;
mod session;
mod types;

#[cfg(any(test, feature = "tests"))]
pub mod mock;

pub use artwork::{ArtworkFetcher, ArtworkLoader, ArtworkRequest, HttpArtworkFetcher};
pub use client::{StoreClient, StoreResponse, StoreTransport};
pub use config::{DEFAULT_STORE_URL, StoreSearchConfig};
pub use error::{FetchError, ParseError, SearchError, StoreClientError};
pub use logger::init_logger;
pub use parser::{
    AudiobookEntry,
    CommonFields,
    EbookEntry,
    ParsedResults,
    SoftwareEntry,
    StoreEntry,
    TrackEntry,
    parse_results,
    parse_top_level,
};
pub use query::{RESULT_LIMIT, build_target};
pub use rows::SearchRow;
pub use session::{SearchSession, SearchState, SessionEvent, SessionEvents, sort_records};
pub use types::{Category, ResultRecord};
