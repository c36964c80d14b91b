//! Intake of raw file selections.
//!
//! Turns a picker or drop batch into queued [`UploadItem`]s with local
//! preview handles. Non-image entries are excluded from the queue and listed
//! in the [`IntakeReport`] so the owner can decide whether to tell the user.
//! Intake does no I/O and never blocks.

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::item::{ItemId, PreviewRegistry, UploadItem};
use crate::metrics;

/// MIME types that carry no information about the payload.
const UNTYPED: &[&str] = &["", "application/octet-stream"];

/// A file as handed over by the picker or drop target.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    /// Declared MIME type; may be empty.
    pub content_type: String,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A file excluded at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub content_type: String,
}

/// Outcome of one intake batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntakeReport {
    /// Ids of the items appended to the queue, in selection order.
    pub accepted: Vec<ItemId>,
    pub skipped: Vec<SkippedFile>,
}

/// Returns the content type to record for `file` if it is an image.
///
/// A declared `image/*` type wins. Files without a useful declared type are
/// sniffed from their leading bytes.
pub fn effective_image_type(file: &RawFile) -> Option<String> {
    let declared = file.content_type.trim().to_ascii_lowercase();
    if declared.starts_with("image/") {
        return Some(declared);
    }
    if !UNTYPED.contains(&declared.as_str()) {
        return None;
    }
    infer::get(&file.bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type().to_string())
}

/// Normalizes a batch into queued items.
///
/// `next_seq` hands out queue positions so items keep selection order.
pub(crate) fn normalize(
    files: Vec<RawFile>,
    previews: &PreviewRegistry,
    mut next_seq: impl FnMut() -> u64,
) -> (Vec<UploadItem>, IntakeReport) {
    let mut items = Vec::with_capacity(files.len());
    let mut report = IntakeReport::default();

    for file in files {
        let Some(content_type) = effective_image_type(&file) else {
            debug!(
                file_name = %file.name,
                content_type = %file.content_type,
                size_bytes = file.size(),
                "Skipping non-image file"
            );
            report.skipped.push(SkippedFile {
                name: file.name,
                content_type: file.content_type,
            });
            continue;
        };

        let preview = previews.allocate(&file.name, file.bytes.clone());
        let item = UploadItem::queued(file.name, content_type, file.bytes, preview, next_seq());
        report.accepted.push(item.id);
        items.push(item);
    }

    metrics::INTAKE_FILES
        .with_label_values(&["accepted"])
        .inc_by(report.accepted.len() as u64);
    metrics::INTAKE_FILES
        .with_label_values(&["skipped"])
        .inc_by(report.skipped.len() as u64);

    debug!(
        accepted = report.accepted.len(),
        skipped = report.skipped.len(),
        "Intake batch normalized"
    );

    (items, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStatus;
    use crate::testing::fixtures;

    #[test]
    fn test_declared_image_type_accepted() {
        let file = RawFile::new("a.JPG", "Image/JPEG", b"whatever".to_vec());
        assert_eq!(effective_image_type(&file), Some("image/jpeg".to_string()));
    }

    #[test]
    fn test_declared_non_image_rejected_without_sniffing() {
        // PNG bytes declared as a PDF stay rejected.
        let file = RawFile::new("doc.pdf", "application/pdf", fixtures::png_bytes(4, 4));
        assert_eq!(effective_image_type(&file), None);
    }

    #[test]
    fn test_untyped_file_is_sniffed() {
        let file = RawFile::new("camera-upload", "", fixtures::png_bytes(4, 4));
        assert_eq!(effective_image_type(&file), Some("image/png".to_string()));

        let text = RawFile::new("notes", "application/octet-stream", b"plain text".to_vec());
        assert_eq!(effective_image_type(&text), None);
    }

    #[test]
    fn test_normalize_filters_and_orders() {
        let previews = PreviewRegistry::new();
        let mut seq = 10;
        let files = vec![
            RawFile::new("one.jpg", "image/jpeg", b"1".to_vec()),
            RawFile::new("readme.txt", "text/plain", b"2".to_vec()),
            RawFile::new("two.png", "image/png", b"22".to_vec()),
        ];

        let (items, report) = normalize(files, &previews, || {
            seq += 1;
            seq
        });

        assert_eq!(items.len(), 2);
        assert_eq!(report.accepted, vec![items[0].id, items[1].id]);
        assert_eq!(
            report.skipped,
            vec![SkippedFile {
                name: "readme.txt".to_string(),
                content_type: "text/plain".to_string(),
            }]
        );

        assert_eq!(items[0].file_name, "one.jpg");
        assert_eq!(items[1].file_name, "two.png");
        assert!(items[0].queue_seq < items[1].queue_seq);
        assert_eq!(items[1].original_size, 2);
        assert!(items.iter().all(|i| i.status == ItemStatus::Queued));
        assert!(items.iter().all(|i| i.preview.is_some() && i.source.is_some()));
        assert_eq!(previews.outstanding(), 2);
    }

    #[test]
    fn test_original_size_matches_raw_file() {
        let previews = PreviewRegistry::new();
        let file = RawFile::new("lobby.png", "image/png", fixtures::png_bytes(8, 8));
        let expected = file.size();

        let (items, _) = normalize(vec![file], &previews, || 1);

        assert!(expected > 0);
        assert_eq!(items[0].original_size, expected);
    }

    #[test]
    fn test_normalize_empty_batch() {
        let previews = PreviewRegistry::new();
        let (items, report) = normalize(Vec::new(), &previews, || 0);
        assert!(items.is_empty());
        assert!(report.accepted.is_empty());
        assert!(report.skipped.is_empty());
        assert_eq!(previews.outstanding(), 0);
    }
}
