//! The search-request lifecycle.
//!
//! A [`SearchSession`] owns at most one in-flight request. Starting a search
//! cancels the previous request and discards the session's claim on it in
//! the same step, so whatever that request eventually produces is stale.
//!
//! Fetches run as spawned tasks. Their completions are tagged with the
//! generation of the request that produced them and sent back to the session,
//! which applies them only from [`SearchSession::next_completion`],
//! [`SearchSession::settle`] or [`SearchSession::pump`]. All state changes
//! therefore happen on the session owner's context, one at a time, in
//! arrival order. A completion whose generation is not the owned one is
//! dropped without touching state.
//!
//! ```text
//! Idle -> Loading -> { Empty | Error | Populated } -> Loading -> ...
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use crate::client::{StoreResponse, StoreTransport};
use crate::error::{FetchError, SearchError};
use crate::parser::{ParsedResults, parse_results, parse_top_level};
use crate::query::build_target;
use crate::types::{Category, ResultRecord};

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    /// No search attempted yet. Never re-entered.
    #[default]
    Idle,
    /// A request is in flight, no records are shown.
    Loading,
    /// The last search completed without records.
    Empty,
    /// The last search failed, carries a user facing message.
    Error(String),
    /// The last search completed with at least one record, sorted by name.
    Populated(Vec<ResultRecord>),
}

impl SearchState {
    /// The records currently on display.
    pub fn records(&self) -> &[ResultRecord] {
        match self {
            SearchState::Populated(records) => records,
            _ => &[],
        }
    }

    /// Whether a transient loading indicator should be shown.
    pub fn shows_loading_indicator(&self) -> bool {
        matches!(self, SearchState::Loading)
    }
}

/// Notifications for the presentation layer, delivered in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(SearchState),
    /// A recoverable problem the user should be told about.
    /// The search itself still completes.
    Alert(String),
}

/// Receiving end of a session's notifications.
pub type SessionEvents = mpsc::UnboundedReceiver<SessionEvent>;

#[derive(Debug)]
struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Debug)]
enum Outcome {
    Cancelled,
    Settled(Result<StoreResponse, FetchError>),
}

#[derive(Debug)]
struct Completion {
    generation: u64,
    outcome: Outcome,
}

/// Owner of the current search state and the single in-flight request.
#[derive(Debug)]
pub struct SearchSession<T> {
    transport: Arc<T>,
    state: SearchState,
    in_flight: Option<InFlight>,
    generation: u64,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<T: StoreTransport> SearchSession<T> {
    /// Create an idle session searching the endpoint of `transport`.
    pub fn new(transport: T) -> (Self, SessionEvents) {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();
        let session = Self {
            transport: Arc::new(transport),
            state: SearchState::Idle,
            in_flight: None,
            generation: 0,
            completions_tx,
            completions_rx,
            events,
        };
        (session, events_rx)
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Whether a request is currently owned by the session.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a search for `term` in `category`.
    ///
    /// Does nothing and returns `false` if `term` is blank. Otherwise cancels
    /// the owned request, if any, moves to [`SearchState::Loading`] and
    /// issues exactly one fetch.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip_all, fields(term = %term.trim(), %category))]
    pub fn start_search(&mut self, term: &str, category: Category) -> bool {
        let term = term.trim();
        if term.is_empty() {
            trace!("ignoring blank search term");
            return false;
        }

        if let Some(superseded) = self.in_flight.take() {
            debug!(
                generation = superseded.generation,
                "cancelling superseded search"
            );
            superseded.cancel.cancel();
        }

        self.generation += 1;
        let generation = self.generation;
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            generation,
            cancel: cancel.clone(),
        });
        self.transition(SearchState::Loading);

        let target = build_target(self.transport.store_url(), term, category);
        debug!(generation, %target, "starting search");

        let transport = Arc::clone(&self.transport);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            // A panicking transport must still settle the search.
            let mut fetch = tokio::spawn(async move { transport.fetch(target).await });
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    fetch.abort();
                    Outcome::Cancelled
                },
                joined = &mut fetch => match joined {
                    Ok(result) => Outcome::Settled(result),
                    Err(err) => {
                        warn!(generation, %err, "store fetch task failed");
                        Outcome::Settled(Err(FetchError::Aborted))
                    },
                },
            };
            // The session may have been dropped in the meantime.
            let _ = completions.send(Completion {
                generation,
                outcome,
            });
        });

        true
    }

    /// Wait for the next completion and apply it.
    ///
    /// Returns whether the completion changed the state, stale and cancelled
    /// completions return `false`. Pends forever if nothing was started.
    /// Cancel safe, so it can be raced against user input.
    pub async fn next_completion(&mut self) -> bool {
        match self.completions_rx.recv().await {
            Some(completion) => self.apply(completion),
            // We hold a sender ourselves, so the channel never closes.
            None => false,
        }
    }

    /// Wait until the owned request, if any, has settled.
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            self.next_completion().await;
        }
    }

    /// Apply all completions that already arrived without waiting.
    ///
    /// Returns the number of completions that changed the state.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, completion: Completion) -> bool {
        let owned = self.in_flight.as_ref().is_some_and(|in_flight| {
            in_flight.generation == completion.generation && !in_flight.cancel.is_cancelled()
        });
        if !owned {
            trace!(
                generation = completion.generation,
                "dropping completion of superseded search"
            );
            return false;
        }

        let result = match completion.outcome {
            Outcome::Settled(result) => result,
            Outcome::Cancelled => {
                trace!(generation = completion.generation, "search cancelled");
                return false;
            },
        };
        self.in_flight = None;

        match finish_search(result) {
            Ok(ParsedResults { records, problem }) => {
                if let Some(problem) = problem {
                    warn!(%problem, "store response had no usable results");
                    self.notify(SessionEvent::Alert(problem.to_string()));
                }
                debug!(
                    generation = completion.generation,
                    n_records = records.len(),
                    "search completed"
                );
                if records.is_empty() {
                    self.transition(SearchState::Empty);
                } else {
                    self.transition(SearchState::Populated(records));
                }
            },
            Err(err) => {
                warn!(generation = completion.generation, %err, "search failed");
                self.transition(SearchState::Error(err.to_string()));
            },
        }
        true
    }

    fn transition(&mut self, state: SearchState) {
        self.state = state.clone();
        self.notify(SessionEvent::StateChanged(state));
    }

    fn notify(&self, event: SessionEvent) {
        // Nobody listening is fine, the state is still queryable.
        let _ = self.events.send(event);
    }
}

/// Turn a settled fetch into sorted records.
fn finish_search(
    result: Result<StoreResponse, FetchError>,
) -> Result<ParsedResults, SearchError> {
    let response = result?;
    if !response.is_success() {
        return Err(FetchError::HttpStatus(response.status).into());
    }
    let document = parse_top_level(&response.body)?;
    let mut parsed = parse_results(&document);
    sort_records(&mut parsed.records);
    Ok(parsed)
}

/// Order records by name, keeping the store's order for equal names.
pub fn sort_records(records: &mut [ResultRecord]) {
    // `sort_by` is stable.
    records.sort_by(|a, b| a.name.cmp(&b.name));
}
