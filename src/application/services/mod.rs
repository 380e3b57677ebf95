//! Services around the search state machine.

pub mod debouncer;
pub mod genre_directory;

pub use debouncer::{DEFAULT_DEBOUNCE, Debouncer};
pub use genre_directory::GenreDirectory;
