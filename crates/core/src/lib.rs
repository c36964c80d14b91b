//! Image gallery upload pipeline.
//!
//! Accepts batches of user-selected files, keeps a revocable local preview
//! for each, and uploads them one at a time (compressed first) to an object
//! store, reporting a debounced aggregate status to the owner.

pub mod compression;
pub mod config;
pub mod intake;
pub mod item;
pub mod metrics;
pub mod pipeline;
pub mod store;
pub mod testing;

pub use compression::{
    compress_or_original, CompressionConfig, CompressionError, Compressor, ImageCompressor,
    ImagePayload,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use intake::{IntakeReport, RawFile, SkippedFile};
pub use item::{ExistingImage, ItemId, ItemStatus, PreviewHandle, PreviewRegistry, UploadItem};
pub use pipeline::{
    GalleryStatus, ImageState, ImageView, PipelineError, PublisherConfig, StatusCallback,
    StatusPublisher, UploadPipeline,
};
pub use store::{build_remote_key, HttpObjectStore, ObjectStore, StorageConfig, StoreError};
