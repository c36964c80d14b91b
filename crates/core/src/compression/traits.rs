//! Trait definitions for the compression stage.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use super::error::CompressionError;
use crate::metrics;

/// An image payload with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Bytes,
    pub content_type: String,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A compressor that reduces an image payload before upload.
#[async_trait]
pub trait Compressor: Send + Sync {
    /// Returns the name of this compressor implementation.
    fn name(&self) -> &str;

    /// Compresses a payload.
    ///
    /// Implementations may return the input unchanged when compressing
    /// would not help.
    async fn compress(&self, payload: ImagePayload) -> Result<ImagePayload, CompressionError>;
}

/// Runs `compressor`, falling back to the original payload on failure.
pub async fn compress_or_original<C>(compressor: &C, payload: ImagePayload) -> ImagePayload
where
    C: Compressor + ?Sized,
{
    let original_len = payload.len();
    match compressor.compress(payload.clone()).await {
        Ok(compressed) if compressed.bytes == payload.bytes => {
            metrics::COMPRESSION_TOTAL
                .with_label_values(&["passthrough"])
                .inc();
            compressed
        }
        Ok(compressed) => {
            metrics::COMPRESSION_TOTAL
                .with_label_values(&["compressed"])
                .inc();
            if compressed.len() < original_len {
                metrics::COMPRESSION_SAVED_BYTES.inc_by((original_len - compressed.len()) as u64);
            }
            debug!(
                compressor = compressor.name(),
                original_bytes = original_len,
                compressed_bytes = compressed.len(),
                "Payload compressed"
            );
            compressed
        }
        Err(e) => {
            metrics::COMPRESSION_TOTAL
                .with_label_values(&["fallback"])
                .inc();
            warn!(
                compressor = compressor.name(),
                error = %e,
                "Compression failed, uploading original payload"
            );
            payload
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HalvingCompressor;

    #[async_trait]
    impl Compressor for HalvingCompressor {
        fn name(&self) -> &str {
            "halving"
        }

        async fn compress(&self, payload: ImagePayload) -> Result<ImagePayload, CompressionError> {
            let half = payload.bytes.slice(..payload.len() / 2);
            Ok(ImagePayload::new(half, "image/jpeg"))
        }
    }

    struct BrokenCompressor;

    #[async_trait]
    impl Compressor for BrokenCompressor {
        fn name(&self) -> &str {
            "broken"
        }

        async fn compress(&self, _payload: ImagePayload) -> Result<ImagePayload, CompressionError> {
            Err(CompressionError::Decode {
                reason: "not an image".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_compressed_payload_is_used() {
        let payload = ImagePayload::new(vec![7u8; 100], "image/png");
        let result = compress_or_original(&HalvingCompressor, payload).await;
        assert_eq!(result.len(), 50);
        assert_eq!(result.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original() {
        let payload = ImagePayload::new(vec![1u8, 2, 3], "image/heic");
        let result = compress_or_original(&BrokenCompressor, payload.clone()).await;
        assert_eq!(result, payload);
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let compressor: Box<dyn Compressor> = Box::new(HalvingCompressor);
        let payload = ImagePayload::new(vec![0u8; 10], "image/png");
        let result = compress_or_original(compressor.as_ref(), payload).await;
        assert_eq!(result.len(), 5);
    }
}
