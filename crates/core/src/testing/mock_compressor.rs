//! Mock compressor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::compression::{CompressionError, Compressor, ImagePayload};

/// Mock implementation of the Compressor trait.
///
/// Passes payloads through unchanged by default, so uploaded bytes can be
/// compared with the selected file. Can be configured to fail, which the
/// pipeline must absorb by uploading the original.
#[derive(Debug, Clone)]
pub struct MockCompressor {
    /// Payloads received, in call order.
    inputs: Arc<RwLock<Vec<ImagePayload>>>,
    /// If set, every call fails with this error.
    error: Arc<RwLock<Option<CompressionError>>>,
    /// Simulated compression duration in milliseconds.
    duration_ms: Arc<RwLock<u64>>,
}

impl Default for MockCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompressor {
    /// Create a new passthrough compressor.
    pub fn new() -> Self {
        Self {
            inputs: Arc::new(RwLock::new(Vec::new())),
            error: Arc::new(RwLock::new(None)),
            duration_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Get all payloads received.
    pub async fn recorded_inputs(&self) -> Vec<ImagePayload> {
        self.inputs.read().await.clone()
    }

    /// Get the number of compress calls.
    pub async fn call_count(&self) -> usize {
        self.inputs.read().await.len()
    }

    /// Make every call fail with the given error, or pass through again with `None`.
    pub async fn set_error(&self, error: Option<CompressionError>) {
        *self.error.write().await = error;
    }

    /// Set the simulated compression duration.
    pub async fn set_duration(&self, duration: Duration) {
        *self.duration_ms.write().await = duration.as_millis() as u64;
    }
}

#[async_trait]
impl Compressor for MockCompressor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn compress(&self, payload: ImagePayload) -> Result<ImagePayload, CompressionError> {
        self.inputs.write().await.push(payload.clone());

        let duration_ms = *self.duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        match self.error.read().await.clone() {
            Some(err) => Err(err),
            None => Ok(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::compress_or_original;

    #[tokio::test]
    async fn test_passthrough_records_input() {
        let compressor = MockCompressor::new();
        let payload = ImagePayload::new(b"pixels".to_vec(), "image/png");

        let result = compressor.compress(payload.clone()).await.unwrap();

        assert_eq!(result, payload);
        assert_eq!(compressor.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original() {
        let compressor = MockCompressor::new();
        compressor
            .set_error(Some(CompressionError::Decode {
                reason: "corrupt".to_string(),
            }))
            .await;
        let payload = ImagePayload::new(b"pixels".to_vec(), "image/png");

        assert!(compressor.compress(payload.clone()).await.is_err());
        assert_eq!(compress_or_original(&compressor, payload.clone()).await, payload);
    }
}
