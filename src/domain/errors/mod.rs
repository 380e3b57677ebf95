//! Domain error types.

mod catalog_error;
mod network_error;

pub use catalog_error::CatalogError;
pub use network_error::{NetworkError, UNKNOWN_STATUS_CODE};
