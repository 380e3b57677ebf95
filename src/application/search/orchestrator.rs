//! Search orchestrator.
//!
//! Owns the search state machine and the accumulated results. All state
//! changes happen through `&mut self` on the owning task; catalog calls run
//! on spawned tasks and report back through a completion channel that the
//! owner drains with [`SearchOrchestrator::process_next`].

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::entities::{Configuration, DEFAULT_POSTER_TIER, Movie, ResultSet};
use crate::domain::errors::CatalogError;
use crate::domain::ports::{FIRST_PAGE, MovieCatalogPort};

use super::state::{Aggregate, Operation, OperationFailure, SearchSnapshot, SearchState};

/// Result of a catalog call, tagged with the request generation.
#[derive(Debug)]
struct Completion {
    generation: u64,
    outcome: Outcome,
}

#[derive(Debug)]
enum Outcome {
    Config(Result<Configuration, CatalogError>),
    Search {
        term: String,
        result: Result<ResultSet, CatalogError>,
    },
    Fetch {
        term: String,
        page: u32,
        result: Result<ResultSet, CatalogError>,
    },
}

struct InFlight {
    generation: u64,
    task: JoinHandle<()>,
}

/// Drives configuration loading, searching and pagination against the catalog.
pub struct SearchOrchestrator {
    catalog: Arc<dyn MovieCatalogPort>,
    poster_tier: usize,
    started: bool,
    state: SearchState,
    aggregate: Aggregate,
    configuration: Option<Configuration>,
    /// Term whose pages make up `aggregate`.
    results_term: Option<String>,
    generation: u64,
    in_flight: Option<InFlight>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    subscribers: Vec<mpsc::UnboundedSender<SearchSnapshot>>,
    last_failure: Option<OperationFailure>,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("movies", &self.aggregate.movies.len())
            .finish_non_exhaustive()
    }
}

impl SearchOrchestrator {
    /// Creates an orchestrator that has not loaded its configuration yet.
    #[must_use]
    pub fn new(catalog: Arc<dyn MovieCatalogPort>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            poster_tier: DEFAULT_POSTER_TIER,
            started: false,
            state: SearchState::Idle(None),
            aggregate: Aggregate::default(),
            configuration: None,
            results_term: None,
            generation: 0,
            in_flight: None,
            completion_tx,
            completion_rx,
            subscribers: Vec::new(),
            last_failure: None,
        }
    }

    /// Selects which poster size token `poster_url` uses.
    #[must_use]
    pub fn with_poster_tier(mut self, tier: usize) -> Self {
        self.poster_tier = tier;
        self
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    /// Returns the results accumulated so far.
    #[must_use]
    pub const fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// Returns the loaded configuration, if any.
    #[must_use]
    pub const fn configuration(&self) -> Option<&Configuration> {
        self.configuration.as_ref()
    }

    /// Returns the most recent failure that was absorbed.
    #[must_use]
    pub const fn last_failure(&self) -> Option<&OperationFailure> {
        self.last_failure.as_ref()
    }

    /// Returns true if a catalog call is outstanding.
    #[must_use]
    pub const fn has_pending_operation(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Copies the current state and results.
    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            state: self.state.clone(),
            aggregate: self.aggregate.clone(),
        }
    }

    /// Registers an observer. It receives a snapshot after every accepted transition.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SearchSnapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Composes the poster URL for `movie`.
    ///
    /// Returns `None` when the configuration is unavailable or the movie has no poster.
    #[must_use]
    pub fn poster_url(&self, movie: &Movie) -> Option<String> {
        let configuration = self.configuration.as_ref()?;
        configuration.poster_url(movie.poster_path()?, self.poster_tier)
    }

    /// Begins loading the catalog configuration.
    ///
    /// Only the first call has an effect.
    pub fn start(&mut self) {
        if self.started {
            warn!(state = %self.state, "Orchestrator already started, ignoring");
            return;
        }
        if !self.enter(SearchState::LoadingConfig) {
            return;
        }
        self.started = true;
        self.spawn(|catalog| async move { Outcome::Config(catalog.get_configuration().await) });
        self.emit();
    }

    /// Starts a search for `term`, replacing the current results once it completes.
    ///
    /// A blank term clears all results and cancels any outstanding operation.
    pub fn start_search(&mut self, term: &str) {
        let term = term.trim();

        if term.is_empty() {
            self.clear_search();
            return;
        }

        if !self.enter(SearchState::Searching(term.to_string())) {
            return;
        }
        self.cancel_in_flight();

        let term = term.to_string();
        self.spawn(move |catalog| async move {
            let result = catalog.search_movies(&term, FIRST_PAGE).await;
            Outcome::Search { term, result }
        });
        self.emit();
    }

    /// Requests the page after the last fetched one.
    ///
    /// Does nothing until a search has succeeded.
    pub fn fetch_next_page(&mut self) {
        if self.aggregate.last_fetched_page == 0 {
            debug!("No successful search yet, ignoring next page request");
            return;
        }
        let Some(term) = self.results_term.clone() else {
            return;
        };

        let Some(page) = self.aggregate.last_fetched_page.checked_add(1) else {
            debug!(
                last_fetched_page = self.aggregate.last_fetched_page,
                "No page follows the last fetched one, ignoring next page request"
            );
            return;
        };
        if !self.enter(SearchState::Fetching(page)) {
            return;
        }
        self.cancel_in_flight();

        self.spawn(move |catalog| async move {
            let result = catalog.search_movies(&term, page).await;
            Outcome::Fetch { term, page, result }
        });
        self.emit();
    }

    /// Acknowledges a configuration failure and returns to idle.
    pub fn reset_config_error(&mut self) {
        if !self.state.is_config_failure() {
            return;
        }
        info!("Configuration failure acknowledged, posters stay disabled");
        self.state = SearchState::Idle(None);
        self.emit();
    }

    /// Waits for the next catalog completion and applies it.
    ///
    /// Pending forever while nothing is outstanding, so it is meant to be
    /// raced against other events. Cancel safe.
    pub async fn process_next(&mut self) {
        if let Some(completion) = self.completion_rx.recv().await {
            self.apply(completion);
        }
    }

    /// Applies every completion that has already arrived. Returns how many were applied.
    pub fn process_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Processes completions until no catalog call is outstanding.
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            self.process_next().await;
        }
    }

    fn clear_search(&mut self) {
        if matches!(
            self.state,
            SearchState::LoadingConfig | SearchState::ConfigFailure(_)
        ) {
            debug!(state = %self.state, "Rejected clearing search");
            return;
        }
        let unchanged = self.state == SearchState::Idle(None)
            && self.aggregate.is_empty()
            && self.in_flight.is_none();
        if unchanged {
            return;
        }
        if !self.enter(SearchState::Idle(None)) {
            return;
        }
        self.cancel_in_flight();
        self.results_term = None;
        self.aggregate.clear();
        self.emit();
    }

    fn apply(&mut self, completion: Completion) {
        let current = self.in_flight.as_ref().map(|f| f.generation);
        if current != Some(completion.generation) {
            debug!(
                generation = completion.generation,
                current = ?current,
                "Discarding stale completion"
            );
            return;
        }
        self.in_flight = None;

        match checked_outcome(completion.outcome) {
            Outcome::Config(Ok(configuration)) => {
                if self.enter(SearchState::Idle(None)) {
                    debug!(
                        poster_sizes = configuration.poster_sizes.len(),
                        "Configuration loaded"
                    );
                    self.configuration = Some(configuration);
                    self.emit();
                }
            }
            Outcome::Config(Err(error)) => {
                warn!(error = %error, "Failed to load configuration");
                if self.enter(SearchState::ConfigFailure(error.clone().into())) {
                    self.record_failure(Operation::LoadConfig, error);
                    self.emit();
                }
            }
            Outcome::Search {
                term,
                result: Ok(page),
            } => {
                if self.enter(SearchState::Idle(Some(page.clone()))) {
                    debug!(term = %term, results = page.total_results, "Search completed");
                    self.aggregate.replace(&page);
                    self.results_term = Some(term);
                    self.emit();
                }
            }
            Outcome::Search {
                term,
                result: Err(error),
            } => {
                warn!(term = %term, error = %error, "Search failed");
                if self.enter(SearchState::Idle(None)) {
                    if self.results_term.as_deref() != Some(term.as_str()) {
                        self.results_term = None;
                        self.aggregate.clear();
                    }
                    self.record_failure(Operation::Search(term), error);
                    self.emit();
                }
            }
            Outcome::Fetch {
                term,
                page,
                result: Ok(result),
            } => {
                if self.enter(SearchState::Idle(Some(result.clone()))) {
                    debug!(term = %term, page, items = result.items.len(), "Page fetched");
                    self.aggregate.append(&result);
                    self.emit();
                }
            }
            Outcome::Fetch {
                term,
                page,
                result: Err(error),
            } => {
                warn!(term = %term, page, error = %error, "Page fetch failed");
                if self.enter(SearchState::Idle(None)) {
                    self.record_failure(Operation::Fetch { term, page }, error);
                    self.emit();
                }
            }
        }
    }

    /// Moves to `next` if the transition table allows it.
    fn enter(&mut self, next: SearchState) -> bool {
        if !self.state.accepts(&next) {
            debug!(from = %self.state, to = %next, "Rejected state transition");
            return false;
        }
        debug!(from = %self.state, to = %next, "State transition");
        self.state = next;
        true
    }

    fn spawn<F, Fut>(&mut self, operation: F)
    where
        F: FnOnce(Arc<dyn MovieCatalogPort>) -> Fut,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let completion_tx = self.completion_tx.clone();
        let future = operation(self.catalog.clone());

        let task = tokio::spawn(async move {
            let outcome = future.await;
            let _ = completion_tx.send(Completion {
                generation,
                outcome,
            });
        });

        self.in_flight = Some(InFlight { generation, task });
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
            debug!(generation = in_flight.generation, "Cancelled outstanding operation");
        }
    }

    fn record_failure(&mut self, operation: Operation, error: CatalogError) {
        self.last_failure = Some(OperationFailure { operation, error });
    }

    fn emit(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

/// Turns a reply for a page other than the one requested into a decode failure.
fn checked_outcome(outcome: Outcome) -> Outcome {
    match outcome {
        Outcome::Search {
            term,
            result: Ok(page),
        } if page.page != FIRST_PAGE => {
            warn!(page = page.page, term = %term, "Search returned an unexpected page");
            Outcome::Search {
                term,
                result: Err(unexpected_page(FIRST_PAGE, page.page)),
            }
        }
        Outcome::Fetch {
            term,
            page,
            result: Ok(result),
        } if result.page != page => {
            warn!(page, received = result.page, term = %term, "Fetch returned an unexpected page");
            Outcome::Fetch {
                term,
                page,
                result: Err(unexpected_page(page, result.page)),
            }
        }
        other => other,
    }
}

fn unexpected_page(requested: u32, received: u32) -> CatalogError {
    CatalogError::decode(format!("requested page {requested}, received page {received}"))
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
