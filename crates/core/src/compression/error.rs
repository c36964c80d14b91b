//! Error types for the compression stage.

use thiserror::Error;

/// Errors that can occur while compressing a payload.
///
/// None of these reach the item: the pipeline falls back to the original bytes.
#[derive(Debug, Clone, Error)]
pub enum CompressionError {
    /// The payload could not be decoded as an image.
    #[error("Failed to decode image: {reason}")]
    Decode { reason: String },

    /// Re-encoding the image failed.
    #[error("Failed to encode image: {reason}")]
    Encode { reason: String },

    /// The blocking worker panicked or was cancelled.
    #[error("Compression worker failed: {0}")]
    Worker(String),
}
