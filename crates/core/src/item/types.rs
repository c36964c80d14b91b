//! Item types.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PreviewHandle;

/// Opaque item identifier, stable for the lifetime of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Allocates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an upload item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Waiting for the scheduler.
    Queued,
    /// Being compressed and uploaded.
    Uploading,
    /// Stored remotely.
    Completed { remote_key: String, remote_url: String },
    /// Upload failed; recoverable through retry.
    Errored { message: String },
}

impl ItemStatus {
    /// Short state name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Uploading => "uploading",
            Self::Completed { .. } => "completed",
            Self::Errored { .. } => "errored",
        }
    }

    /// Queued or uploading.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Queued | Self::Uploading)
    }
}

/// A single image tracked by the pipeline.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub id: ItemId,
    /// Original file name as selected by the user.
    pub file_name: String,
    /// Effective MIME type of the original selection.
    pub content_type: String,
    /// Original payload. Released once the item completes.
    pub source: Option<Bytes>,
    /// Local display handle; `None` for images seeded from remote storage.
    pub preview: Option<PreviewHandle>,
    pub status: ItemStatus,
    pub is_featured: bool,
    pub original_size: u64,
    /// Position in the upload queue. Reassigned on retry.
    pub(crate) queue_seq: u64,
}

impl UploadItem {
    /// Creates a queued item for a freshly selected file.
    pub(crate) fn queued(
        file_name: String,
        content_type: String,
        source: Bytes,
        preview: PreviewHandle,
        queue_seq: u64,
    ) -> Self {
        Self {
            id: ItemId::new(),
            file_name,
            content_type,
            original_size: source.len() as u64,
            source: Some(source),
            preview: Some(preview),
            status: ItemStatus::Queued,
            is_featured: false,
            queue_seq,
        }
    }

    /// Creates a completed item for an image that already lives in remote storage.
    pub(crate) fn existing(image: ExistingImage) -> Self {
        let file_name = image
            .remote_key
            .rsplit('/')
            .next()
            .unwrap_or(&image.remote_key)
            .to_string();
        Self {
            id: ItemId::new(),
            file_name,
            content_type: String::new(),
            source: None,
            preview: None,
            status: ItemStatus::Completed {
                remote_key: image.remote_key,
                remote_url: image.remote_url,
            },
            is_featured: image.is_featured,
            original_size: 0,
            queue_seq: 0,
        }
    }

    pub fn remote_key(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Completed { remote_key, .. } => Some(remote_key),
            _ => None,
        }
    }

    pub fn remote_url(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Completed { remote_url, .. } => Some(remote_url),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Errored { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, ItemStatus::Completed { .. })
    }
}

/// An image already stored remotely, used to seed the gallery when editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingImage {
    pub remote_key: String,
    pub remote_url: String,
    #[serde(default)]
    pub is_featured: bool,
}
