//! Configuration for the HTTP object store.

use serde::{Deserialize, Serialize};

/// Storage service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the storage service (e.g., "https://project.example.co").
    pub url: String,
    /// Bucket holding gallery images.
    pub bucket: String,
    /// Service API key, sent as bearer token and `apikey` header.
    pub api_key: String,
    /// Optional request timeout. When absent the transport's own failure surfaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Cache-Control max-age for uploaded objects, in seconds.
    #[serde(default = "default_cache_control")]
    pub cache_control_secs: u64,
}

fn default_cache_control() -> u64 {
    3600
}

impl StorageConfig {
    pub fn new(url: impl Into<String>, bucket: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bucket: bucket.into(),
            api_key: api_key.into(),
            timeout_secs: None,
            cache_control_secs: default_cache_control(),
        }
    }

    /// Sets a request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            url = "https://project.example.co"
            bucket = "property-images"
            api_key = "secret"
        "#;
        let config: StorageConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bucket, "property-images");
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.cache_control_secs, 3600);
    }

    #[test]
    fn test_builder() {
        let config = StorageConfig::new("http://localhost:54321", "b", "k").with_timeout_secs(30);
        assert_eq!(config.timeout_secs, Some(30));
    }
}
