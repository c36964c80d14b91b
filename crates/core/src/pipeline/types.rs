//! Types for the upload pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::item::{ItemId, ItemStatus, UploadItem};

/// Errors returned by user-driven pipeline operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No item with this id is tracked.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// The item's current state does not allow the operation.
    #[error("cannot {action} item {id} while it is {from}")]
    InvalidTransition {
        id: ItemId,
        from: &'static str,
        action: &'static str,
    },

    /// The pipeline has been torn down.
    #[error("pipeline has been shut down")]
    ShutDown,
}

/// Coarse item state reported to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageState {
    Queued,
    Uploading,
    Completed,
    Errored,
}

impl From<&ItemStatus> for ImageState {
    fn from(status: &ItemStatus) -> Self {
        match status {
            ItemStatus::Queued => Self::Queued,
            ItemStatus::Uploading => Self::Uploading,
            ItemStatus::Completed { .. } => Self::Completed,
            ItemStatus::Errored { .. } => Self::Errored,
        }
    }
}

/// Per-image entry of a [`GalleryStatus`]. Carries no error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub id: ItemId,
    pub status: ImageState,
    pub remote_url: Option<String>,
    /// Display flag: the explicit featured item, else the first completed one.
    pub is_featured: bool,
    pub preview_uri: Option<String>,
}

/// Aggregate status delivered to the owning context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GalleryStatus {
    pub images: Vec<ImageView>,
    /// True while any item is queued or uploading.
    pub is_uploading: bool,
    /// Number of queued and uploading items.
    pub uploading_count: usize,
}

impl GalleryStatus {
    /// Derives the status from the full item list.
    pub fn from_items(items: &[UploadItem]) -> Self {
        let featured = featured_id(items);
        let uploading_count = items.iter().filter(|i| i.status.is_pending()).count();
        let images = items
            .iter()
            .map(|item| ImageView {
                id: item.id,
                status: ImageState::from(&item.status),
                remote_url: item.remote_url().map(String::from),
                is_featured: Some(item.id) == featured,
                preview_uri: item.preview.as_ref().map(|p| p.uri().to_string()),
            })
            .collect();

        Self {
            images,
            is_uploading: uploading_count > 0,
            uploading_count,
        }
    }
}

/// The explicitly featured item, or the first completed one in enqueue order.
pub fn featured_id(items: &[UploadItem]) -> Option<ItemId> {
    items
        .iter()
        .find(|i| i.is_featured)
        .or_else(|| items.iter().find(|i| i.is_completed()))
        .map(|i| i.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ExistingImage;

    fn completed(key: &str) -> UploadItem {
        UploadItem::existing(ExistingImage {
            remote_key: key.to_string(),
            remote_url: format!("https://cdn/{}", key),
            is_featured: false,
        })
    }

    #[test]
    fn test_status_counts_pending_only() {
        let mut queued = completed("o/1.jpg");
        queued.status = ItemStatus::Queued;
        let mut errored = completed("o/2.jpg");
        errored.status = ItemStatus::Errored {
            message: "HTTP 500".to_string(),
        };
        let done = completed("o/3.jpg");

        let status = GalleryStatus::from_items(&[queued, errored, done]);

        assert!(status.is_uploading);
        assert_eq!(status.uploading_count, 1);
        assert_eq!(status.images[1].status, ImageState::Errored);
        assert_eq!(status.images[2].remote_url.as_deref(), Some("https://cdn/o/3.jpg"));
        assert!(status.images[0].remote_url.is_none());
    }

    #[test]
    fn test_implicit_featured_is_first_completed() {
        let mut errored = completed("o/1.jpg");
        errored.status = ItemStatus::Errored {
            message: String::new(),
        };
        let first_done = completed("o/2.jpg");
        let second_done = completed("o/3.jpg");
        let items = vec![errored, first_done.clone(), second_done];

        assert_eq!(featured_id(&items), Some(first_done.id));
        let status = GalleryStatus::from_items(&items);
        let flags: Vec<bool> = status.images.iter().map(|i| i.is_featured).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_explicit_featured_wins() {
        let first = completed("o/1.jpg");
        let mut second = completed("o/2.jpg");
        second.is_featured = true;
        let items = vec![first, second.clone()];

        assert_eq!(featured_id(&items), Some(second.id));
    }

    #[test]
    fn test_empty_gallery() {
        let status = GalleryStatus::from_items(&[]);
        assert_eq!(status, GalleryStatus::default());
        assert!(featured_id(&[]).is_none());
    }

    #[test]
    fn test_status_serializes_without_error_text() {
        let mut errored = completed("o/1.jpg");
        errored.status = ItemStatus::Errored {
            message: "secret backend detail".to_string(),
        };
        let json = serde_json::to_string(&GalleryStatus::from_items(&[errored])).unwrap();
        assert!(json.contains("\"errored\""));
        assert!(!json.contains("secret backend detail"));
    }
}
