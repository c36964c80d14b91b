use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// Overrides use the `GALLERY_` prefix with `__` between nested keys,
/// e.g. `GALLERY_COMPRESSION__QUALITY=70`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("GALLERY_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[compression]
quality = 70

[publisher]
debounce_ms = 100
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.compression.quality, 70);
        assert_eq!(config.publisher.debounce_ms, 100);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[compression]
quality = "high"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/gallery.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[compression]
max_dimension = 2048

[storage]
url = "http://localhost:54321"
bucket = "listing-photos"
api_key = "local-key"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.compression.max_dimension, 2048);
        assert_eq!(config.storage.unwrap().bucket, "listing-photos");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[publisher]\ndebounce_ms = 300").unwrap();

        figment::Jail::expect_with(|jail| {
            jail.set_env("GALLERY_PUBLISHER__DEBOUNCE_MS", "50");
            let config = load_config(temp_file.path()).map_err(|e| e.to_string())?;
            assert_eq!(config.publisher.debounce_ms, 50);
            Ok(())
        });
    }
}
