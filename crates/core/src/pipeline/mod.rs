//! Upload pipeline.
//!
//! The pipeline owns the ordered item list and a single background worker
//! that drains the queue one item at a time:
//!
//! ```text
//! add_files ──▶ Queued ──▶ Uploading ──▶ Completed
//!                  ▲            │
//!                  │            ▼
//!                retry ◀──── Errored
//! ```
//!
//! Removal is allowed from any state. Every mutation replaces the item list
//! wholesale and feeds the derived [`GalleryStatus`] to a [`StatusPublisher`],
//! which delivers it to the owner after a quiet window.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gallery_core::{ImageCompressor, HttpObjectStore, PublisherConfig, RawFile, UploadPipeline};
//!
//! let pipeline = UploadPipeline::new(
//!     "property-42",
//!     HttpObjectStore::new(storage_config)?,
//!     ImageCompressor::default(),
//!     PublisherConfig::default(),
//!     Arc::new(|status| println!("{} uploading", status.uploading_count)),
//! );
//!
//! let report = pipeline.add_files(vec![RawFile::new("pool.jpg", "image/jpeg", bytes)]).await?;
//! pipeline.wait_idle().await;
//! pipeline.shutdown().await;
//! ```

mod config;
mod publisher;
mod types;
mod uploader;

pub use config::PublisherConfig;
pub use publisher::{StatusCallback, StatusPublisher};
pub use types::{featured_id, GalleryStatus, ImageState, ImageView, PipelineError};
pub use uploader::UploadPipeline;
