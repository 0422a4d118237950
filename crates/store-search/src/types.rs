//! Search domain types.
//!
//! [`ResultRecord`] is the single normalized shape every store entry is
//! parsed into, regardless of which wrapper type the store used for it.

use derive_more::Display;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category selector
// ---------------------------------------------------------------------------

/// The category a search is scoped to.
///
/// The order of the variants matches the segment order of the category
/// selector, see [`Category::from_index`].
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[display("All")]
    All,
    #[display("Music")]
    Music,
    #[display("Software")]
    Software,
    #[display("E-Books")]
    EBooks,
}

impl Category {
    /// All categories in selector order.
    pub const ALL: [Category; 4] = [
        Category::All,
        Category::Music,
        Category::Software,
        Category::EBooks,
    ];

    /// Map a selector index to a category.
    ///
    /// Indices outside the selector fall back to [`Category::All`].
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// The `entity` filter sent to the store, `None` for an unrestricted search.
    pub fn entity(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            Category::Music => Some("musicTrack"),
            Category::Software => Some("software"),
            Category::EBooks => Some("ebook"),
        }
    }
}

// ---------------------------------------------------------------------------
// Result record
// ---------------------------------------------------------------------------

/// One catalog item as shown to the user.
///
/// Records are only ever built from a successfully parsed entry,
/// so `name` is never empty.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub name: String,
    /// May be empty if the store did not name an artist.
    pub artist_name: String,
    /// Raw store kind, e.g. `song` or `ebook`.
    pub kind: String,
    pub artwork_thumbnail_url: Option<String>,
    pub artwork_large_url: Option<String>,
    pub store_url: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub genre: Option<String>,
}

impl ResultRecord {
    /// Human readable label for the raw store kind.
    pub fn kind_for_display(&self) -> &str {
        match self.kind.as_str() {
            "album" => "Album",
            "audiobook" => "Audio Book",
            "book" => "Book",
            "ebook" => "E-Book",
            "feature-movie" => "Movie",
            "music-video" => "Music Video",
            "podcast" => "Podcast",
            "software" => "App",
            "song" => "Song",
            "tv-episode" => "TV Episode",
            other => other,
        }
    }

    /// Secondary line of a result row.
    pub fn artist_label(&self) -> String {
        if self.artist_name.is_empty() {
            return "Unknown".to_string();
        }
        format!("{} ({})", self.artist_name, self.kind_for_display())
    }
}
