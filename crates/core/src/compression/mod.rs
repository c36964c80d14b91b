//! Compression stage for image payloads.
//!
//! This module provides the `Compressor` trait and an `image`-based
//! implementation that bounds the pixel dimensions and output size of a
//! payload before it is uploaded.
//!
//! Compression never fails an item: [`compress_or_original`] falls back to
//! the original payload on any error, trading a larger upload for a
//! successful one.
//!
//! # Example
//!
//! ```ignore
//! use gallery_core::compression::{compress_or_original, CompressionConfig, ImageCompressor, ImagePayload};
//!
//! let compressor = ImageCompressor::new(CompressionConfig::default());
//! let payload = ImagePayload::new(bytes, "image/png");
//! let ready = compress_or_original(&compressor, payload).await;
//! println!("{} bytes as {}", ready.bytes.len(), ready.content_type);
//! ```

mod config;
mod error;
mod image_compressor;
mod traits;

pub use config::CompressionConfig;
pub use error::CompressionError;
pub use image_compressor::ImageCompressor;
pub use traits::{compress_or_original, Compressor, ImagePayload};
