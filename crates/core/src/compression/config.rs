//! Configuration for the compression stage.

use serde::{Deserialize, Serialize};

/// Configuration for the image compressor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// When disabled, payloads pass through untouched.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum length of the longest edge, in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Target upper bound for the encoded output, in bytes.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: u64,

    /// JPEG quality used for the first encode (1-100).
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Lowest quality tried while shrinking to fit `max_output_bytes`.
    #[serde(default = "default_min_quality")]
    pub min_quality: u8,
}

fn default_true() -> bool {
    true
}

fn default_max_dimension() -> u32 {
    1920
}

fn default_max_output_bytes() -> u64 {
    1024 * 1024 // 1 MB
}

fn default_quality() -> u8 {
    80
}

fn default_min_quality() -> u8 {
    40
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_dimension: default_max_dimension(),
            max_output_bytes: default_max_output_bytes(),
            quality: default_quality(),
            min_quality: default_min_quality(),
        }
    }
}

impl CompressionConfig {
    /// Enables or disables compression.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the maximum edge length.
    pub fn with_max_dimension(mut self, pixels: u32) -> Self {
        self.max_dimension = pixels;
        self
    }

    /// Sets the output size target.
    pub fn with_max_output_bytes(mut self, bytes: u64) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    /// Sets the initial JPEG quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }
}
