use serde::{Deserialize, Serialize};

use crate::compression::CompressionConfig;
use crate::pipeline::PublisherConfig;
use crate::store::StorageConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub compression: CompressionConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// HTTP object store settings. Absent when the host supplies its own store.
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

/// Sanitized config for logging and diagnostics (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub compression: CompressionConfig,
    pub publisher: PublisherConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<SanitizedStorageConfig>,
}

/// Sanitized storage config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub url: String,
    pub bucket: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub cache_control_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            compression: config.compression.clone(),
            publisher: config.publisher.clone(),
            storage: config.storage.as_ref().map(|s| SanitizedStorageConfig {
                url: s.url.clone(),
                bucket: s.bucket.clone(),
                api_key_configured: !s.api_key.is_empty(),
                timeout_secs: s.timeout_secs,
                cache_control_secs: s.cache_control_secs,
            }),
        }
    }
}
