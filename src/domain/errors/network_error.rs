//! Status payload reported by the catalog API.

use serde::{Deserialize, Serialize};

/// Status code used when a failure did not come with an API status.
pub const UNKNOWN_STATUS_CODE: i32 = -1;

/// API-level failure as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{status_code}: {status_message}")]
#[allow(missing_docs)]
pub struct NetworkError {
    pub status_message: String,
    pub status_code: i32,
}

impl NetworkError {
    /// Creates an error with an API status code.
    #[must_use]
    pub fn new(status_code: i32, status_message: impl Into<String>) -> Self {
        Self {
            status_message: status_message.into(),
            status_code,
        }
    }

    /// Creates an error with no known status code.
    #[must_use]
    pub fn unknown(status_message: impl Into<String>) -> Self {
        Self::new(UNKNOWN_STATUS_CODE, status_message)
    }
}
