//! One page of search results.

use serde::{Deserialize, Serialize};

use super::Movie;

/// A single page returned by a movie search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// One-based page number.
    pub page: u32,
    /// Page count for the whole search.
    #[serde(default)]
    pub total_pages: u32,
    /// Result count for the whole search.
    #[serde(default)]
    pub total_results: u32,
    /// Movies on this page, in catalog order.
    #[serde(rename = "results", default)]
    pub items: Vec<Movie>,
}

impl ResultSet {
    /// Creates a page of results.
    #[must_use]
    pub const fn new(page: u32, total_pages: u32, total_results: u32, items: Vec<Movie>) -> Self {
        Self {
            page,
            total_pages,
            total_results,
            items,
        }
    }

    /// Returns true if the page carries no movies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl std::fmt::Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "page {} of {} ({} results)",
            self.page, self.total_pages, self.total_results
        )
    }
}
