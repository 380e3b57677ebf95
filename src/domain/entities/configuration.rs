//! Remote catalog configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Poster tier used when nothing else is configured (the third size token).
pub const DEFAULT_POSTER_TIER: usize = 2;

/// Image hosting details needed to turn relative poster paths into URLs.
///
/// Size token lists are ordered smallest to largest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Configuration {
    pub image_base_url: String,
    pub image_secure_base_url: String,
    pub poster_sizes: Vec<String>,
    pub backdrop_sizes: Vec<String>,
    pub logo_sizes: Vec<String>,
    pub profile_sizes: Vec<String>,
    pub still_sizes: Vec<String>,
    pub change_keys: BTreeSet<String>,
}

impl Configuration {
    /// Returns the poster size token for `tier`.
    ///
    /// Tiers past the end of the list clamp to the largest token.
    #[must_use]
    pub fn poster_size(&self, tier: usize) -> Option<&str> {
        self.poster_sizes
            .get(tier)
            .or_else(|| self.poster_sizes.last())
            .map(String::as_str)
    }

    /// Composes the secure URL for a poster.
    ///
    /// Returns `None` when there is no size token or no secure base URL.
    #[must_use]
    pub fn poster_url(&self, poster_path: &str, tier: usize) -> Option<String> {
        if self.image_secure_base_url.is_empty() || poster_path.trim().is_empty() {
            return None;
        }
        let size = self.poster_size(tier)?;
        Some(join_url(&[&self.image_secure_base_url, size, poster_path]))
    }
}

fn join_url(segments: &[&str]) -> String {
    let mut url = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let segment = if i == 0 {
            segment.trim_end_matches('/')
        } else {
            segment.trim_matches('/')
        };
        if i > 0 {
            url.push('/');
        }
        url.push_str(segment);
    }
    url
}
