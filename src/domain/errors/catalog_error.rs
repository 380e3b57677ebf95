//! Catalog error types.

use thiserror::Error;

use super::NetworkError;

/// Catalog failure variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CatalogError {
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("request rejected: {0}")]
    Client(NetworkError),

    #[error("server error: {0}")]
    Server(NetworkError),

    #[error("failed to decode response: {message}")]
    Decode { message: String },

    #[error("response contained no data")]
    NoData,
}

impl CatalogError {
    /// Creates transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns the API status, if the server reported one.
    #[must_use]
    pub const fn api_status(&self) -> Option<&NetworkError> {
        match self {
            Self::Client(status) | Self::Server(status) => Some(status),
            _ => None,
        }
    }

    /// Returns whether the failure happened before a response was read.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<CatalogError> for NetworkError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Client(status) | CatalogError::Server(status) => status,
            other => Self::unknown(other.to_string()),
        }
    }
}
