//! Configuration for the status publisher.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for debounced status notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Quiet window before a notification is delivered, in milliseconds.
    /// Every change restarts the window.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PublisherConfig {
    /// Sets the debounce window.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce_ms = window.as_millis() as u64;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PublisherConfig::default();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_with_debounce() {
        let config = PublisherConfig::default().with_debounce(Duration::from_millis(25));
        assert_eq!(config.debounce_ms, 25);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: PublisherConfig = toml::from_str("").unwrap();
        assert_eq!(config, PublisherConfig::default());
    }
}
