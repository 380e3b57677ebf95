//! Image source port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::CatalogError;

/// Port for fetching raw image bytes.
#[async_trait]
pub trait ImageSourcePort: Send + Sync {
    /// Downloads the body at `url`.
    async fn fetch_image(&self, url: &str) -> Result<Bytes, CatalogError>;
}
