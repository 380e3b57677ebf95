//! Search state machine values.

use std::sync::Arc;

use crate::domain::entities::{Movie, ResultSet};
use crate::domain::errors::{CatalogError, NetworkError};

/// What the search subsystem is currently doing.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing in flight; carries the page that completed last, if any.
    Idle(Option<ResultSet>),
    /// Loading the catalog configuration.
    LoadingConfig,
    /// Fetching the first page for a term.
    Searching(String),
    /// Fetching a follow-up page for the current term.
    Fetching(u32),
    /// Configuration could not be loaded; must be acknowledged.
    ConfigFailure(NetworkError),
}

impl SearchState {
    /// Returns true if a network operation is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::LoadingConfig | Self::Searching(_) | Self::Fetching(_)
        )
    }

    /// Returns true while a configuration failure awaits acknowledgement.
    #[must_use]
    pub const fn is_config_failure(&self) -> bool {
        matches!(self, Self::ConfigFailure(_))
    }

    /// Returns whether the transition table allows moving to `next`.
    ///
    /// Leaving `ConfigFailure` is never allowed here; only an explicit
    /// acknowledgement may do that.
    #[must_use]
    pub fn accepts(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::Idle(_), Self::LoadingConfig) => true,
            (Self::LoadingConfig, Self::Idle(_) | Self::ConfigFailure(_)) => true,
            (Self::Idle(_), Self::Idle(_) | Self::Searching(_) | Self::Fetching(_)) => true,
            (Self::Searching(_) | Self::Fetching(_), Self::Idle(_)) => true,
            // A different term supersedes the outstanding search or page fetch.
            (Self::Searching(current), Self::Searching(term)) => current != term,
            // A new search cancels the outstanding page fetch before it is issued,
            // so the fetch can never complete into the new term's results.
            (Self::Fetching(_), Self::Searching(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle(Some(result)) => write!(
                f,
                "Idle with {} results in {} page(s)",
                result.total_results, result.total_pages
            ),
            Self::Idle(None) => write!(f, "Idle with zero movies"),
            Self::LoadingConfig => write!(f, "Loading configuration"),
            Self::Searching(term) => write!(f, "Searching for {term:?}"),
            Self::Fetching(page) => write!(f, "Fetching page {page}"),
            Self::ConfigFailure(error) => write!(f, "Configuration failure ({error})"),
        }
    }
}

/// Page counters and movies accumulated across fetched pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Zero until a search succeeds.
    pub last_fetched_page: u32,
    /// Page count reported by the most recent reply.
    pub total_pages: u32,
    /// Result count reported by the most recent reply.
    pub total_results: u32,
    /// Movies from every fetched page, in page order.
    pub movies: Arc<Vec<Movie>>,
}

impl Aggregate {
    /// Returns true if no search has succeeded since the last reset.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.last_fetched_page == 0
    }

    /// Returns true if the catalog reported more pages than were fetched.
    #[must_use]
    pub const fn has_more_pages(&self) -> bool {
        self.last_fetched_page != 0 && self.last_fetched_page < self.total_pages
    }

    pub(crate) fn replace(&mut self, page: &ResultSet) {
        self.update_counters(page);
        self.movies = Arc::new(page.items.clone());
    }

    pub(crate) fn append(&mut self, page: &ResultSet) {
        self.update_counters(page);
        Arc::make_mut(&mut self.movies).extend(page.items.iter().cloned());
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    fn update_counters(&mut self, page: &ResultSet) {
        self.last_fetched_page = page.page;
        self.total_pages = page.total_pages;
        self.total_results = page.total_results;
    }
}

/// State and aggregate as seen by observers after a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    /// State after the transition.
    pub state: SearchState,
    /// Results after the transition.
    pub aggregate: Aggregate,
}

impl SearchSnapshot {
    /// Returns true if a network operation is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Returns true if the catalog has pages beyond the fetched ones.
    #[must_use]
    pub const fn has_more_pages(&self) -> bool {
        self.aggregate.has_more_pages()
    }

    /// Returns true if the last search completed with no matches.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        matches!(&self.state, SearchState::Idle(Some(result)) if result.items.is_empty())
            && self.aggregate.movies.is_empty()
    }
}

/// Network operation driven by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Loading the catalog configuration.
    LoadConfig,
    /// First page for a term.
    Search(String),
    /// Follow-up page for a term.
    Fetch {
        /// Term whose results are being extended.
        term: String,
        /// Requested page number.
        page: u32,
    },
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadConfig => write!(f, "configuration load"),
            Self::Search(term) => write!(f, "search for {term:?}"),
            Self::Fetch { term, page } => write!(f, "page {page} of {term:?}"),
        }
    }
}

/// A failure the orchestrator absorbed instead of surfacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationFailure {
    /// The operation that failed.
    pub operation: Operation,
    /// Why it failed.
    pub error: CatalogError,
}
