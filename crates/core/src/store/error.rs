//! Error types for the store module.

use thiserror::Error;

/// Errors returned by an object store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Could not reach the storage service.
    #[error("Connection to storage failed: {0}")]
    ConnectionFailed(String),

    /// The transport gave up waiting.
    #[error("Storage request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("Storage returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Any other request failure.
    #[error("Storage request failed: {0}")]
    Request(String),

    /// The store is misconfigured.
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Request(_) | Self::InvalidConfig(_) => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}
