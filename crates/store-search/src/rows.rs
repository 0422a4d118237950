//! Rows a list view renders for a [`SearchState`].

use crate::session::SearchState;
use crate::types::ResultRecord;

/// One row of the result list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchRow<'a> {
    /// Spinner shown while a request is in flight.
    Loading,
    /// Placeholder for a search without results.
    NothingFound,
    /// The failure message of the last search.
    Failed(&'a str),
    Result(&'a ResultRecord),
}

impl SearchRow<'_> {
    /// Only actual results can be selected.
    pub fn is_selectable(&self) -> bool {
        matches!(self, SearchRow::Result(_))
    }
}

impl SearchState {
    /// The rows to display, in display order.
    ///
    /// Nothing is shown before the first search.
    pub fn rows(&self) -> Vec<SearchRow<'_>> {
        match self {
            SearchState::Idle => Vec::new(),
            SearchState::Loading => vec![SearchRow::Loading],
            SearchState::Empty => vec![SearchRow::NothingFound],
            SearchState::Error(message) => vec![SearchRow::Failed(message)],
            SearchState::Populated(records) => records.iter().map(SearchRow::Result).collect(),
        }
    }
}
