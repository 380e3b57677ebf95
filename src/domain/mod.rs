//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;

pub use entities::{Configuration, Genre, ImageKey, Movie, MovieId, PosterImage, ResultSet};
pub use errors::{CatalogError, NetworkError};
pub use ports::{ImageSourcePort, MovieCatalogPort};
