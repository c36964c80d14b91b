use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Compression bounds are non-zero and quality is within 1..=100
/// - min_quality does not exceed quality
/// - Storage url (when present) is http(s) and bucket is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let compression = &config.compression;
    if compression.max_dimension == 0 {
        return Err(ConfigError::ValidationError(
            "compression.max_dimension cannot be 0".to_string(),
        ));
    }
    if compression.max_output_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "compression.max_output_bytes cannot be 0".to_string(),
        ));
    }
    if !(1..=100).contains(&compression.quality) {
        return Err(ConfigError::ValidationError(format!(
            "compression.quality must be between 1 and 100, got {}",
            compression.quality
        )));
    }
    if compression.min_quality == 0 || compression.min_quality > compression.quality {
        return Err(ConfigError::ValidationError(format!(
            "compression.min_quality must be between 1 and quality ({}), got {}",
            compression.quality, compression.min_quality
        )));
    }

    if let Some(storage) = &config.storage {
        let url = storage.url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.url cannot be empty".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "storage.url must start with http:// or https://, got {}",
                url
            )));
        }
        if storage.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.bucket cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CompressionConfig;
    use crate::store::StorageConfig;

    fn with_compression(compression: CompressionConfig) -> Config {
        Config {
            compression,
            ..Config::default()
        }
    }

    fn with_storage(url: &str, bucket: &str) -> Config {
        Config {
            storage: Some(StorageConfig::new(url, bucket, "key")),
            ..Config::default()
        }
    }

    fn assert_invalid(config: &Config, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains(needle), "{}", msg),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_storage_config() {
        assert!(validate_config(&with_storage("https://project.example.co", "images")).is_ok());
        assert!(validate_config(&with_storage("http://localhost:54321", "images")).is_ok());
    }

    #[test]
    fn test_validate_compression_bounds() {
        assert_invalid(
            &with_compression(CompressionConfig::default().with_max_dimension(0)),
            "max_dimension",
        );
        assert_invalid(
            &with_compression(CompressionConfig::default().with_max_output_bytes(0)),
            "max_output_bytes",
        );
        assert_invalid(
            &with_compression(CompressionConfig::default().with_quality(0)),
            "compression.quality",
        );
        assert_invalid(
            &with_compression(CompressionConfig::default().with_quality(101)),
            "compression.quality",
        );
    }

    #[test]
    fn test_validate_min_quality_above_quality() {
        let mut compression = CompressionConfig::default().with_quality(50);
        compression.min_quality = 60;
        assert_invalid(&with_compression(compression), "min_quality");
    }

    #[test]
    fn test_validate_storage_rejects_bad_values() {
        assert_invalid(&with_storage("", "images"), "storage.url");
        assert_invalid(&with_storage("ftp://files.example.co", "images"), "http");
        assert_invalid(&with_storage("https://project.example.co", " "), "storage.bucket");
    }
}
