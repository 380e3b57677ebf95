//! Genre name lookup.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entities::{Genre, Movie};

/// Maps genre ids to display names.
#[derive(Debug, Clone, Default)]
pub struct GenreDirectory {
    names: HashMap<u32, String>,
}

impl GenreDirectory {
    /// Builds the lookup from the catalog's genre list.
    #[must_use]
    pub fn new(genres: BTreeSet<Genre>) -> Self {
        Self {
            names: genres.into_iter().map(|g| (g.id, g.name)).collect(),
        }
    }

    /// Display name for `id`, if the catalog listed it.
    #[must_use]
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Names of the genres tagged on `movie`, skipping unknown ids.
    #[must_use]
    pub fn names_for(&self, movie: &Movie) -> Vec<&str> {
        movie
            .genre_ids()
            .into_iter()
            .flatten()
            .filter_map(|id| self.name(*id))
            .collect()
    }

    /// Number of known genres.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no genres are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_for_movie() {
        let directory = GenreDirectory::new(BTreeSet::from([
            Genre::new(12, "Adventure"),
            Genre::new(28, "Action"),
            Genre::new(878, "Science Fiction"),
        ]));
        let movie = Movie::new(11u64, "Star Wars").with_genres([878, 12, 9999]);

        assert_eq!(directory.names_for(&movie), vec!["Adventure", "Science Fiction"]);
        assert!(directory.names_for(&Movie::new(1u64, "Untagged")).is_empty());
    }
}
