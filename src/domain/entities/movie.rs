//! Movie entity.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::serde_utils;

/// Catalog identifier of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl MovieId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MovieId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A single search hit as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    id: MovieId,
    title: String,
    #[serde(default)]
    original_title: String,
    #[serde(default)]
    original_language: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default, with = "serde_utils::release_date")]
    release_date: Option<NaiveDate>,
    #[serde(default)]
    popularity: Option<f64>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    vote_count: Option<u32>,
    #[serde(default)]
    genre_ids: Option<BTreeSet<u32>>,
    #[serde(default)]
    adult: Option<bool>,
    #[serde(default)]
    video: Option<bool>,
}

#[allow(missing_docs)]
impl Movie {
    /// Creates a movie with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            original_title: title.clone(),
            title,
            original_language: String::new(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            popularity: None,
            vote_average: None,
            vote_count: None,
            genre_ids: None,
            adult: None,
            video: None,
        }
    }

    #[must_use]
    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }

    #[must_use]
    pub fn with_poster_path(mut self, path: impl Into<String>) -> Self {
        self.poster_path = Some(path.into());
        self
    }

    #[must_use]
    pub const fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    #[must_use]
    pub const fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    #[must_use]
    pub fn with_genres(mut self, genre_ids: impl IntoIterator<Item = u32>) -> Self {
        self.genre_ids = Some(genre_ids.into_iter().collect());
        self
    }

    #[must_use]
    pub const fn id(&self) -> MovieId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn original_title(&self) -> &str {
        &self.original_title
    }

    #[must_use]
    pub fn original_language(&self) -> &str {
        &self.original_language
    }

    #[must_use]
    pub fn overview(&self) -> &str {
        &self.overview
    }

    #[must_use]
    pub fn poster_path(&self) -> Option<&str> {
        self.poster_path.as_deref()
    }

    #[must_use]
    pub fn backdrop_path(&self) -> Option<&str> {
        self.backdrop_path.as_deref()
    }

    #[must_use]
    pub const fn release_date(&self) -> Option<NaiveDate> {
        self.release_date
    }

    #[must_use]
    pub const fn popularity(&self) -> Option<f64> {
        self.popularity
    }

    #[must_use]
    pub const fn vote_average(&self) -> Option<f64> {
        self.vote_average
    }

    #[must_use]
    pub const fn vote_count(&self) -> Option<u32> {
        self.vote_count
    }

    #[must_use]
    pub const fn genre_ids(&self) -> Option<&BTreeSet<u32>> {
        self.genre_ids.as_ref()
    }

    #[must_use]
    pub const fn is_adult(&self) -> Option<bool> {
        self.adult
    }

    #[must_use]
    pub const fn is_video(&self) -> Option<bool> {
        self.video
    }

    /// Release year, if the release date is known.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date.map(|d| d.year())
    }
}
