//! Plain-text rendering of search results.

use crate::application::search::{OperationFailure, SearchSnapshot};
use crate::application::services::GenreDirectory;
use crate::domain::entities::Movie;

const LONG_DATE_FORMAT: &str = "%B %-d, %Y";

/// One listed movie: number, title, release date, popularity and genres.
#[must_use]
pub fn movie_line(number: usize, movie: &Movie, genres: &GenreDirectory) -> String {
    let released = movie.release_date().map_or_else(
        || "Unknown".to_string(),
        |date| date.format(LONG_DATE_FORMAT).to_string(),
    );
    let mut line = format!("{number:>3}. {}  ({released})", movie.title());

    if let Some(popularity) = movie.popularity() {
        line.push_str(&format!("  popularity {popularity:.0}"));
    }

    let names = genres.names_for(movie);
    if !names.is_empty() {
        line.push_str(&format!("  [{}]", names.join(", ")));
    }
    line
}

/// Summary below the list.
#[must_use]
pub fn footer(snapshot: &SearchSnapshot) -> String {
    if snapshot.is_empty_result() {
        return "No Data".to_string();
    }
    let aggregate = &snapshot.aggregate;
    let mut footer = format!(
        "Showing {} of {} results (page {} of {})",
        aggregate.movies.len(),
        aggregate.total_results,
        aggregate.last_fetched_page,
        aggregate.total_pages
    );
    if snapshot.has_more_pages() {
        footer.push_str(", :next for more");
    }
    footer
}

/// One-line description of an absorbed failure.
#[must_use]
pub fn failure_line(failure: &OperationFailure) -> String {
    format!("Failed {}: {}", failure.operation, failure.error)
}
