//! Movie catalog port definition.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::entities::{Configuration, Genre, ResultSet};
use crate::domain::errors::CatalogError;

/// First page of any search.
pub const FIRST_PAGE: u32 = 1;

/// Port for the remote movie catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieCatalogPort: Send + Sync {
    /// Fetches the image hosting configuration.
    async fn get_configuration(&self) -> Result<Configuration, CatalogError>;

    /// Fetches the list of movie genres.
    async fn get_genres(&self) -> Result<BTreeSet<Genre>, CatalogError>;

    /// Searches movies matching `query`, returning the one-based `page`.
    async fn search_movies(&self, query: &str, page: u32) -> Result<ResultSet, CatalogError>;
}
