//! Genre entity.

use serde::{Deserialize, Serialize};

/// A catalog genre such as "Action" or "Drama".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Genre {
    /// Genre identifier referenced by `Movie::genre_ids`.
    pub id: u32,
    /// Display name.
    pub name: String,
}

impl Genre {
    /// Creates a genre.
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
