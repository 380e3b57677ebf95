//! Domain types for poster images.

use std::sync::Arc;

/// A decoded poster, shared between the cache and its readers.
pub type PosterImage = Arc<image::DynamicImage>;

/// Cache key for an image: the canonical form of its URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey(String);

impl ImageKey {
    /// Canonicalises `url`. Returns `None` if it is not an absolute URL.
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        reqwest::Url::parse(url.trim())
            .ok()
            .map(|parsed| Self(parsed.as_str().to_string()))
    }

    /// Returns the canonical URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
