//! Error handling for store searches.
//!
//! Every terminal failure of a search ends up as the message of
//! [`crate::SearchState::Error`], so the `Display` of these types is
//! user facing.

use thiserror::Error;

/// Failures of the fetch layer.
///
/// Cancellation is deliberately not represented here,
/// a cancelled fetch never produces an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The transport failed before a response arrived (DNS, connection, ...).
    /// Carries the transport's own description.
    #[error("{0}")]
    Transport(String),
    /// A response arrived but could not be read as an HTTP response.
    #[error("Invalid response from store.")]
    InvalidResponse,
    /// The store answered with a status outside of `200..=299`.
    #[error("Store returned HTTP status {0}.")]
    HttpStatus(u16),
    /// The fetch task ended without an outcome, e.g. a panicking transport.
    #[error("Search request failed unexpectedly.")]
    Aborted,
}

/// Failures to interpret a response payload.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse JSON response from store.")]
    MalformedDocument(#[source] serde_json::Error),
    /// The document parsed but has no usable `results` array.
    #[error("Failed to parse results from store.")]
    MalformedResultsField,
}

/// Any failure that ends a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failures constructing a [`crate::StoreClient`].
#[derive(Debug, Error)]
pub enum StoreClientError {
    #[error("invalid header '{name}'")]
    InvalidHeader {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_contains_code() {
        let err = SearchError::from(FetchError::HttpStatus(404));
        assert!(err.to_string().contains("404"), "{err}");
    }

    #[test]
    fn transport_message_is_verbatim() {
        let err = SearchError::from(FetchError::Transport(
            "error sending request for url (http://localhost:1/)".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "error sending request for url (http://localhost:1/)"
        );
    }

    #[test]
    fn malformed_document_keeps_source() {
        let json_err = serde_json::from_slice::<serde_json::Value>(b"<html>").unwrap_err();
        let err = SearchError::from(ParseError::MalformedDocument(json_err));
        assert_eq!(err.to_string(), "Failed to parse JSON response from store.");
        assert!(std::error::Error::source(&err).is_some());
    }
}
