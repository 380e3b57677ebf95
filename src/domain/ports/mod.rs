mod image_source_port;
mod movie_catalog_port;

pub use image_source_port::ImageSourcePort;
pub use movie_catalog_port::{FIRST_PAGE, MovieCatalogPort};
