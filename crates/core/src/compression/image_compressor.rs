//! `image`-based compressor.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, Rgb, RgbImage};

use super::config::CompressionConfig;
use super::error::CompressionError;
use super::traits::{Compressor, ImagePayload};

/// Output content type of re-encoded payloads.
const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Quality decrement between attempts to fit the size target.
const QUALITY_STEP: u8 = 10;

/// Types that are uploaded as-is: re-encoding would drop animation or cannot decode.
const PASSTHROUGH_TYPES: &[&str] = &["image/gif", "image/svg+xml"];

/// Compressor that downsizes and re-encodes images as JPEG.
///
/// Decoding and encoding are CPU-bound and run on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct ImageCompressor {
    config: CompressionConfig,
}

impl ImageCompressor {
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }
}

#[async_trait]
impl Compressor for ImageCompressor {
    fn name(&self) -> &str {
        "image"
    }

    async fn compress(&self, payload: ImagePayload) -> Result<ImagePayload, CompressionError> {
        if !self.config.enabled || PASSTHROUGH_TYPES.contains(&payload.content_type.as_str()) {
            return Ok(payload);
        }

        let config = self.config.clone();
        tokio::task::spawn_blocking(move || compress_blocking(&config, payload))
            .await
            .map_err(|e| CompressionError::Worker(e.to_string()))?
    }
}

fn compress_blocking(
    config: &CompressionConfig,
    payload: ImagePayload,
) -> Result<ImagePayload, CompressionError> {
    let img = image::load_from_memory(&payload.bytes).map_err(|e| CompressionError::Decode {
        reason: e.to_string(),
    })?;

    let (width, height) = img.dimensions();
    let needs_resize = width.max(height) > config.max_dimension;
    let img = if needs_resize {
        img.resize(config.max_dimension, config.max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = flatten(&img);
    let mut quality = config.quality.clamp(1, 100);
    let floor = config.min_quality.clamp(1, quality);

    let mut encoded = encode_jpeg(&rgb, quality)?;
    while encoded.len() as u64 > config.max_output_bytes && quality > floor {
        quality = quality.saturating_sub(QUALITY_STEP).max(floor);
        encoded = encode_jpeg(&rgb, quality)?;
    }

    if !needs_resize && encoded.len() >= payload.len() {
        return Ok(payload);
    }

    Ok(ImagePayload::new(encoded, OUTPUT_CONTENT_TYPE))
}

/// Converts to RGB, compositing any alpha channel over white.
fn flatten(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let over_white = |c: u8| -> u8 {
            let a = u16::from(a);
            ((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8
        };
        Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)
        .map_err(|e| CompressionError::Encode {
            reason: e.to_string(),
        })?;
    Ok(out)
}
