//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the pipeline's external
//! seams, allowing end-to-end pipeline tests without a storage service.
//!
//! # Example
//!
//! ```rust,ignore
//! use gallery_core::testing::{fixtures, MockCompressor, MockObjectStore};
//!
//! let store = MockObjectStore::new();
//! store.set_put_duration(Duration::from_millis(20)).await;
//!
//! let pipeline = UploadPipeline::new("owner", store.clone(), MockCompressor::new(), config, callback);
//! pipeline.add_files(vec![fixtures::image_file("a.jpg")]).await?;
//! pipeline.wait_idle().await;
//!
//! assert_eq!(store.put_count().await, 1);
//! ```

mod mock_compressor;
mod mock_store;

pub use mock_compressor::MockCompressor;
pub use mock_store::{MockObjectStore, RecordedDelete, RecordedPut};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Cursor;

    use image::codecs::jpeg::JpegEncoder;
    use image::{ColorType, ImageFormat, RgbImage, RgbaImage};

    use crate::intake::RawFile;
    use crate::item::ExistingImage;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        })
    }

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png)
            .expect("in-memory PNG encode");
        cursor.into_inner()
    }

    /// A smooth gradient PNG; compresses well.
    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        encode_png(&gradient(width, height))
    }

    /// An RGBA PNG: fully transparent black, with an opaque red block in the middle third.
    pub fn transparent_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            let inside = (width / 3..2 * width / 3).contains(&x)
                && (height / 3..2 * height / 3).contains(&y);
            if inside {
                image::Rgba([220, 20, 20, 255])
            } else {
                image::Rgba([0, 0, 0, 0])
            }
        });
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png)
            .expect("in-memory PNG encode");
        cursor.into_inner()
    }

    /// A PNG of pseudo-random noise; PNG cannot compress it, JPEG can.
    pub fn noise_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut state: u32 = 0x9E37_79B9;
        let img = RgbImage::from_fn(width, height, |_, _| {
            let mut channel = || {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            };
            image::Rgb([channel(), channel(), channel()])
        });
        encode_png(&img)
    }

    /// A gradient JPEG encoded at `quality`.
    pub fn jpeg_bytes(width: u32, height: u32, quality: u8) -> Vec<u8> {
        let img = gradient(width, height);
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode(img.as_raw(), width, height, ColorType::Rgb8)
            .expect("in-memory JPEG encode");
        out
    }

    /// A small JPEG file as selected by the user.
    pub fn image_file(name: &str) -> RawFile {
        RawFile::new(name, "image/jpeg", jpeg_bytes(16, 16, 80))
    }

    /// A JPEG file whose bytes encode `tag`, so uploads can be told apart.
    pub fn tagged_image_file(name: &str, tag: u8) -> RawFile {
        let mut bytes = jpeg_bytes(16, 16, 80);
        bytes.push(tag);
        RawFile::new(name, "image/jpeg", bytes)
    }

    /// A non-image file.
    pub fn text_file(name: &str) -> RawFile {
        RawFile::new(name, "text/plain", b"not an image".to_vec())
    }

    /// An image already in remote storage.
    pub fn existing_image(remote_key: &str, is_featured: bool) -> ExistingImage {
        ExistingImage {
            remote_key: remote_key.to_string(),
            remote_url: format!("https://mock.storage/public/{}", remote_key),
            is_featured,
        }
    }
}
