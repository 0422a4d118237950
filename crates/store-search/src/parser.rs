//! Parsing of store search responses.
//!
//! The store returns a heterogeneous `results` array. Each entry is one of a
//! closed set of shapes, discriminated by `wrapperType` (or by `kind` for
//! ebooks, which carry no wrapper type). Every shape has its own
//! deserializer feeding the single normalized [`ResultRecord`].
//!
//! Entries that match no known shape, or that lack a name, are skipped.
//! Partial upstream data is normal and never fails a search.

use serde::Deserialize;
use serde_json::{Map, Value};
use serde_with::{DefaultOnError, serde_as};
use tracing::{trace, warn};

use crate::error::ParseError;
use crate::types::ResultRecord;

/// Decode a response payload into its top level JSON object.
pub fn parse_top_level(bytes: &[u8]) -> Result<Map<String, Value>, ParseError> {
    serde_json::from_slice(bytes).map_err(ParseError::MalformedDocument)
}

/// Records parsed from a response document.
#[derive(Debug, Default)]
pub struct ParsedResults {
    /// Records in the order the store returned them.
    pub records: Vec<ResultRecord>,
    /// Set if the document had no usable `results` array,
    /// in which case `records` is empty.
    pub problem: Option<ParseError>,
}

/// Extract all recognizable records from a response document.
///
/// A missing or non-array `results` field is reported through
/// [`ParsedResults::problem`] rather than failing.
pub fn parse_results(document: &Map<String, Value>) -> ParsedResults {
    let Some(Value::Array(entries)) = document.get("results") else {
        warn!("response document has no results array");
        return ParsedResults {
            records: Vec::new(),
            problem: Some(ParseError::MalformedResultsField),
        };
    };

    let records = entries
        .iter()
        .filter_map(|entry| {
            let record = StoreEntry::from_value(entry).map(ResultRecord::from);
            if record.is_none() {
                trace!(?entry, "skipping unrecognized store entry");
            }
            record
        })
        .collect();

    ParsedResults {
        records,
        problem: None,
    }
}

// ---------------------------------------------------------------------------
// Entry shapes
// ---------------------------------------------------------------------------

/// The store entry shapes we know how to display.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEntry {
    Track(TrackEntry),
    Audiobook(AudiobookEntry),
    Software(SoftwareEntry),
    Ebook(EbookEntry),
}

impl StoreEntry {
    /// Dispatch a raw entry to its shape.
    ///
    /// Returns `None` for unknown shapes and for entries missing a
    /// required field.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let object = entry.as_object()?;
        let wrapper_type = object.get("wrapperType").and_then(Value::as_str);
        let kind = object.get("kind").and_then(Value::as_str);

        let parsed = match (wrapper_type, kind) {
            (Some("track"), _) => TrackEntry::deserialize(entry).map(StoreEntry::Track),
            (Some("audiobook"), _) => {
                AudiobookEntry::deserialize(entry).map(StoreEntry::Audiobook)
            },
            (Some("software"), _) => SoftwareEntry::deserialize(entry).map(StoreEntry::Software),
            (None, Some("ebook")) => EbookEntry::deserialize(entry).map(StoreEntry::Ebook),
            _ => return None,
        };

        let parsed = parsed.ok()?;
        if parsed.name().trim().is_empty() {
            return None;
        }
        Some(parsed)
    }

    fn name(&self) -> &str {
        match self {
            StoreEntry::Track(track) => &track.track_name,
            StoreEntry::Audiobook(audiobook) => &audiobook.collection_name,
            StoreEntry::Software(software) => &software.track_name,
            StoreEntry::Ebook(ebook) => &ebook.track_name,
        }
    }
}

/// Fields every shape carries.
///
/// Values of an unexpected JSON type are treated as absent.
#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub artist_name: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub currency: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub artwork_url60: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub artwork_url100: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntry {
    pub track_name: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub kind: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub track_price: Option<f64>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub primary_genre_name: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub track_view_url: Option<String>,
    #[serde(flatten)]
    pub common: CommonFields,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudiobookEntry {
    pub collection_name: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub collection_price: Option<f64>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub primary_genre_name: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub collection_view_url: Option<String>,
    #[serde(flatten)]
    pub common: CommonFields,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareEntry {
    pub track_name: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub kind: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub price: Option<f64>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub primary_genre_name: Option<String>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub track_view_url: Option<String>,
    #[serde(flatten)]
    pub common: CommonFields,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbookEntry {
    pub track_name: String,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub price: Option<f64>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub track_view_url: Option<String>,
    #[serde(flatten)]
    pub common: CommonFields,
}

fn record_with_common(common: CommonFields, name: String, kind: String) -> ResultRecord {
    ResultRecord {
        name,
        artist_name: common.artist_name.unwrap_or_default(),
        kind,
        artwork_thumbnail_url: common.artwork_url60,
        artwork_large_url: common.artwork_url100,
        currency: common.currency,
        ..Default::default()
    }
}

impl From<StoreEntry> for ResultRecord {
    fn from(entry: StoreEntry) -> Self {
        match entry {
            StoreEntry::Track(track) => ResultRecord {
                price: track.track_price,
                genre: track.primary_genre_name,
                store_url: track.track_view_url,
                ..record_with_common(
                    track.common,
                    track.track_name,
                    track.kind.unwrap_or_else(|| "song".to_string()),
                )
            },
            StoreEntry::Audiobook(audiobook) => ResultRecord {
                price: audiobook.collection_price,
                genre: audiobook.primary_genre_name,
                store_url: audiobook.collection_view_url,
                ..record_with_common(
                    audiobook.common,
                    audiobook.collection_name,
                    "audiobook".to_string(),
                )
            },
            StoreEntry::Software(software) => ResultRecord {
                price: software.price,
                genre: software.primary_genre_name,
                store_url: software.track_view_url,
                ..record_with_common(
                    software.common,
                    software.track_name,
                    software.kind.unwrap_or_else(|| "software".to_string()),
                )
            },
            StoreEntry::Ebook(ebook) => ResultRecord {
                price: ebook.price,
                genre: ebook
                    .genres
                    .filter(|genres| !genres.is_empty())
                    .map(|genres| genres.join(", ")),
                store_url: ebook.track_view_url,
                ..record_with_common(ebook.common, ebook.track_name, "ebook".to_string())
            },
        }
    }
}
