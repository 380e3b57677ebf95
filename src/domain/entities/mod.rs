//! Domain entities.

mod configuration;
mod genre;
mod image;
mod movie;
mod result_set;

pub use configuration::{Configuration, DEFAULT_POSTER_TIER};
pub use genre::Genre;
pub use self::image::{ImageKey, PosterImage};
pub use movie::{Movie, MovieId};
pub use result_set::ResultSet;
