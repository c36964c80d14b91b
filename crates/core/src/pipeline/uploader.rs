//! Upload pipeline implementation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::sync::{Notify, RwLock};
use tracing::{debug, error, info, warn};

use crate::compression::{compress_or_original, Compressor, ImagePayload};
use crate::intake::{self, IntakeReport, RawFile};
use crate::item::{ExistingImage, ItemId, ItemStatus, PreviewHandle, PreviewRegistry, UploadItem};
use crate::metrics;
use crate::store::{build_remote_key, ObjectStore};

use super::config::PublisherConfig;
use super::publisher::{StatusCallback, StatusPublisher};
use super::types::{featured_id, GalleryStatus, PipelineError};

/// Work claimed by the upload worker for one item.
struct Claim {
    id: ItemId,
    file_name: String,
    content_type: String,
    source: Bytes,
}

/// State shared between the pipeline handle and its upload worker.
struct Shared<S, C> {
    owner_id: String,
    store: S,
    compressor: C,
    /// Ordered item list. Every mutation swaps in a new collection.
    items: RwLock<Arc<Vec<UploadItem>>>,
    previews: PreviewRegistry,
    publisher: StatusPublisher,
    /// Single-flight guard, checked and set before the worker's first await.
    worker_active: AtomicBool,
    shut_down: AtomicBool,
    next_seq: AtomicU64,
    idle: Notify,
}

/// The gallery upload pipeline.
///
/// Accepts file batches, uploads them one at a time through the compressor
/// and object store, and reports a debounced [`GalleryStatus`] to its owner.
pub struct UploadPipeline<S: ObjectStore, C: Compressor> {
    shared: Arc<Shared<S, C>>,
}

impl<S: ObjectStore + 'static, C: Compressor + 'static> UploadPipeline<S, C> {
    /// Creates a pipeline whose remote keys are namespaced by `owner_id`.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new(
        owner_id: impl Into<String>,
        store: S,
        compressor: C,
        config: PublisherConfig,
        on_status: StatusCallback,
    ) -> Self {
        let owner_id = owner_id.into();
        info!(
            owner_id = %owner_id,
            store = store.name(),
            compressor = compressor.name(),
            "Upload pipeline created"
        );

        Self {
            shared: Arc::new(Shared {
                owner_id,
                store,
                compressor,
                items: RwLock::new(Arc::new(Vec::new())),
                previews: PreviewRegistry::new(),
                publisher: StatusPublisher::spawn(config.debounce(), on_status),
                worker_active: AtomicBool::new(false),
                shut_down: AtomicBool::new(false),
                next_seq: AtomicU64::new(1),
                idle: Notify::new(),
            }),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.shared.owner_id
    }

    /// Preview handles allocated by this pipeline.
    pub fn previews(&self) -> &PreviewRegistry {
        &self.shared.previews
    }

    /// Appends the image files of a batch to the queue and wakes the worker.
    pub async fn add_files(&self, files: Vec<RawFile>) -> Result<IntakeReport, PipelineError> {
        if self.shared.is_shut_down() {
            return Err(PipelineError::ShutDown);
        }

        let shared = &self.shared;
        let (new_items, report) = intake::normalize(files, &shared.previews, || {
            shared.next_seq.fetch_add(1, Ordering::Relaxed)
        });
        if new_items.is_empty() {
            return Ok(report);
        }

        let handles: Vec<PreviewHandle> =
            new_items.iter().filter_map(|i| i.preview.clone()).collect();
        let appended = shared
            .replace_items(move |items| {
                let mut next = items.to_vec();
                next.extend(new_items);
                Ok((next, ()))
            })
            .await;
        if let Err(e) = appended {
            for handle in &handles {
                shared.previews.revoke(handle);
            }
            return Err(e);
        }

        info!(accepted = report.accepted.len(), skipped = report.skipped.len(), "Files queued");
        self.process_queue();
        Ok(report)
    }

    /// Seeds images that already live in remote storage as completed items.
    ///
    /// Only the first featured image keeps its flag.
    pub async fn load_existing(
        &self,
        images: Vec<ExistingImage>,
    ) -> Result<Vec<ItemId>, PipelineError> {
        self.shared
            .replace_items(|items| {
                let mut featured_taken = items.iter().any(|i| i.is_featured);
                let mut next = items.to_vec();
                let mut ids = Vec::with_capacity(images.len());
                for image in images {
                    let mut item = UploadItem::existing(image);
                    if item.is_featured {
                        item.is_featured = !featured_taken;
                        featured_taken = true;
                    }
                    ids.push(item.id);
                    next.push(item);
                }
                Ok((next, ids))
            })
            .await
    }

    /// Starts the upload worker unless one is already running.
    ///
    /// Returns `true` if this call started the worker. Calls made while a
    /// worker is active are no-ops; the active worker picks up new items.
    pub fn process_queue(&self) -> bool {
        if self.shared.is_shut_down() {
            return false;
        }
        if self.shared.worker_active.swap(true, Ordering::SeqCst) {
            debug!("Upload worker already active");
            return false;
        }

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared.drain_queue().await;
        });
        true
    }

    /// Removes an item.
    ///
    /// A completed item's remote object is deleted on a best-effort basis;
    /// failure is logged and removal proceeds. A queued item is never
    /// uploaded; an uploading item's result is discarded when it resolves.
    pub async fn remove(&self, id: ItemId) -> Result<(), PipelineError> {
        let removed = self
            .shared
            .replace_items(|items| {
                let removed = items
                    .iter()
                    .find(|i| i.id == id)
                    .cloned()
                    .ok_or(PipelineError::ItemNotFound(id))?;
                let next = items.iter().filter(|i| i.id != id).cloned().collect();
                Ok((next, removed))
            })
            .await?;

        if let Some(key) = removed.remote_key() {
            self.shared.delete_remote(key).await;
        }
        if let Some(preview) = &removed.preview {
            self.shared.previews.revoke(preview);
        }

        info!(item_id = %id, status = removed.status.name(), "Item removed");
        Ok(())
    }

    /// Re-queues an errored item behind the items already queued.
    pub async fn retry(&self, id: ItemId) -> Result<(), PipelineError> {
        let shared = &self.shared;
        shared
            .replace_items(|items| {
                let target = items
                    .iter()
                    .find(|i| i.id == id)
                    .ok_or(PipelineError::ItemNotFound(id))?;
                if !matches!(target.status, ItemStatus::Errored { .. }) {
                    return Err(PipelineError::InvalidTransition {
                        id,
                        from: target.status.name(),
                        action: "retry",
                    });
                }

                let seq = shared.next_seq.fetch_add(1, Ordering::Relaxed);
                let next = items
                    .iter()
                    .map(|item| {
                        let mut item = item.clone();
                        if item.id == id {
                            item.status = ItemStatus::Queued;
                            item.queue_seq = seq;
                        }
                        item
                    })
                    .collect();
                Ok((next, ()))
            })
            .await?;

        info!(item_id = %id, "Item queued for retry");
        self.process_queue();
        Ok(())
    }

    /// Makes `id` the only featured item.
    pub async fn set_featured(&self, id: ItemId) -> Result<(), PipelineError> {
        self.shared
            .replace_items(|items| {
                if !items.iter().any(|i| i.id == id) {
                    return Err(PipelineError::ItemNotFound(id));
                }
                let next = items
                    .iter()
                    .map(|item| {
                        let mut item = item.clone();
                        item.is_featured = item.id == id;
                        item
                    })
                    .collect();
                Ok((next, ()))
            })
            .await?;

        debug!(item_id = %id, "Featured item set");
        Ok(())
    }

    /// Snapshot of the ordered item list.
    pub async fn items(&self) -> Arc<Vec<UploadItem>> {
        self.shared.snapshot().await
    }

    /// Current aggregate status, undebounced.
    pub async fn status(&self) -> GalleryStatus {
        GalleryStatus::from_items(&self.shared.snapshot().await)
    }

    /// The featured item for display: explicit, else the first completed.
    pub async fn featured(&self) -> Option<ItemId> {
        featured_id(&self.shared.snapshot().await)
    }

    /// Waits until no item is queued or uploading, or the pipeline shuts down.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            if self.shared.is_shut_down() || !self.shared.has_pending().await {
                return;
            }
            notified.await;
        }
    }

    /// Tears the pipeline down.
    ///
    /// Cancels pending status notifications, drops every item and revokes
    /// all outstanding preview handles. An upload still in flight is
    /// discarded when it resolves.
    pub async fn shutdown(&self) {
        let shared = &self.shared;
        shared.publisher.shutdown();
        {
            let mut items = shared.items.write().await;
            if shared.shut_down.swap(true, Ordering::SeqCst) {
                return;
            }
            *items = Arc::new(Vec::new());
        }
        let revoked = shared.previews.revoke_all();
        shared.idle.notify_waiters();
        info!(owner_id = %shared.owner_id, revoked_previews = revoked, "Upload pipeline shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.is_shut_down()
    }
}

impl<S: ObjectStore, C: Compressor> Drop for UploadPipeline<S, C> {
    fn drop(&mut self) {
        let shared = &self.shared;
        if shared.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        shared.publisher.shutdown();
        shared.previews.revoke_all();
        shared.idle.notify_waiters();
    }
}

impl<S: ObjectStore, C: Compressor> Shared<S, C> {
    fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    async fn snapshot(&self) -> Arc<Vec<UploadItem>> {
        Arc::clone(&*self.items.read().await)
    }

    async fn has_pending(&self) -> bool {
        self.items.read().await.iter().any(|i| i.status.is_pending())
    }

    async fn has_queued(&self) -> bool {
        self.items
            .read()
            .await
            .iter()
            .any(|i| i.status == ItemStatus::Queued)
    }

    /// Replaces the item list with the collection built by `f`.
    async fn replace_items<R>(
        &self,
        f: impl FnOnce(&[UploadItem]) -> Result<(Vec<UploadItem>, R), PipelineError>,
    ) -> Result<R, PipelineError> {
        let mut items = self.items.write().await;
        if self.is_shut_down() {
            return Err(PipelineError::ShutDown);
        }
        let (next, out) = f(items.as_slice())?;
        self.commit(&mut *items, next);
        Ok(out)
    }

    /// Installs a new item list and publishes the derived status.
    fn commit(&self, items: &mut Arc<Vec<UploadItem>>, next: Vec<UploadItem>) {
        debug_assert!(
            next.iter()
                .filter(|i| i.status == ItemStatus::Uploading)
                .count()
                <= 1,
            "more than one item uploading"
        );
        debug_assert!(
            next.iter().filter(|i| i.is_featured).count() <= 1,
            "more than one featured item"
        );

        self.publisher.notify(GalleryStatus::from_items(&next));
        *items = Arc::new(next);
    }

    /// Marks the earliest queued item as uploading and returns its work.
    async fn claim_next(&self) -> Option<Claim> {
        let mut items = self.items.write().await;
        if self.is_shut_down() {
            return None;
        }

        loop {
            let target = items
                .iter()
                .filter(|i| i.status == ItemStatus::Queued)
                .min_by_key(|i| i.queue_seq)?;
            let id = target.id;

            let Some(source) = target.source.clone() else {
                error!(item_id = %id, "Queued item has no source payload");
                let next = with_status(items.as_slice(), id, ItemStatus::Errored {
                    message: "source payload missing".to_string(),
                });
                self.commit(&mut *items, next);
                continue;
            };

            let claim = Claim {
                id,
                file_name: target.file_name.clone(),
                content_type: target.content_type.clone(),
                source,
            };
            let next = with_status(items.as_slice(), id, ItemStatus::Uploading);
            self.commit(&mut *items, next);
            return Some(claim);
        }
    }

    /// Worker loop: uploads queued items one at a time until none remain.
    async fn drain_queue(&self) {
        debug!("Upload worker started");
        loop {
            while let Some(claim) = self.claim_next().await {
                self.upload(claim).await;
            }

            self.worker_active.store(false, Ordering::SeqCst);
            // An enqueue that raced the flag clear saw an active worker and did not start one.
            if self.is_shut_down()
                || !self.has_queued().await
                || self.worker_active.swap(true, Ordering::SeqCst)
            {
                break;
            }
        }
        self.idle.notify_waiters();
        debug!("Upload worker idle");
    }

    /// Compresses and uploads one claimed item, then writes the outcome back.
    async fn upload(&self, claim: Claim) {
        let started = Instant::now();
        let id = claim.id;

        let payload = compress_or_original(
            &self.compressor,
            ImagePayload::new(claim.source, claim.content_type.clone()),
        )
        .await;

        if !self.is_uploading(id).await {
            debug!(item_id = %id, "Item removed before upload started");
            record_upload("discarded", started);
            return;
        }

        let key = build_remote_key(&self.owner_id, &claim.file_name, &claim.content_type);
        debug!(item_id = %id, key = %key, size_bytes = payload.len(), "Uploading item");

        match self.store.put(&key, payload.bytes, &payload.content_type).await {
            Ok(()) => {
                let url = self.store.public_url(&key).await;
                let completed = ItemStatus::Completed {
                    remote_key: key.clone(),
                    remote_url: url,
                };
                match self.write_back(id, completed).await {
                    Ok(()) => {
                        info!(item_id = %id, key = %key, "Upload completed");
                        record_upload("completed", started);
                    }
                    Err(e) => {
                        debug!(item_id = %id, key = %key, reason = %e, "Discarding upload result");
                        record_upload("discarded", started);
                        self.delete_remote(&key).await;
                    }
                }
            }
            Err(e) => {
                warn!(
                    item_id = %id,
                    key = %key,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Upload failed"
                );
                let errored = ItemStatus::Errored {
                    message: e.to_string(),
                };
                match self.write_back(id, errored).await {
                    Ok(()) => record_upload("errored", started),
                    Err(_) => record_upload("discarded", started),
                }
            }
        }
    }

    async fn is_uploading(&self, id: ItemId) -> bool {
        self.items
            .read()
            .await
            .iter()
            .any(|i| i.id == id && i.status == ItemStatus::Uploading)
    }

    /// Applies a terminal status to an item that is still uploading.
    ///
    /// Fails if the item was removed (or the pipeline torn down) meanwhile.
    async fn write_back(&self, id: ItemId, status: ItemStatus) -> Result<(), PipelineError> {
        self.replace_items(|items| {
            if !items
                .iter()
                .any(|i| i.id == id && i.status == ItemStatus::Uploading)
            {
                return Err(PipelineError::ItemNotFound(id));
            }
            Ok((with_status(items, id, status), ()))
        })
        .await
    }

    /// Best-effort remote delete. Failures are logged, never surfaced.
    async fn delete_remote(&self, key: &str) -> bool {
        match self.store.delete(key).await {
            Ok(()) => {
                metrics::REMOTE_DELETES.with_label_values(&["ok"]).inc();
                debug!(key = %key, "Remote object deleted");
                true
            }
            Err(e) => {
                metrics::REMOTE_DELETES.with_label_values(&["failed"]).inc();
                warn!(key = %key, error = %e, "Failed to delete remote object");
                false
            }
        }
    }
}

/// Copies `items`, setting `status` on `id`. Completion releases the source payload.
fn with_status(items: &[UploadItem], id: ItemId, status: ItemStatus) -> Vec<UploadItem> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            if item.id == id {
                if matches!(status, ItemStatus::Completed { .. }) {
                    item.source = None;
                }
                item.status = status.clone();
            }
            item
        })
        .collect()
}

fn record_upload(result: &str, started: Instant) {
    metrics::UPLOADS_TOTAL.with_label_values(&[result]).inc();
    metrics::UPLOAD_DURATION
        .with_label_values(&[result])
        .observe(started.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCompressor, MockObjectStore};
    use std::sync::Mutex;
    use std::time::Duration;

    fn pipeline() -> UploadPipeline<MockObjectStore, MockCompressor> {
        UploadPipeline::new(
            "property-7",
            MockObjectStore::new(),
            MockCompressor::new(),
            PublisherConfig::default().with_debounce(Duration::from_millis(10)),
            Arc::new(|_| {}),
        )
    }

    #[test]
    fn test_with_status_releases_source_on_completion() {
        let previews = PreviewRegistry::new();
        let (items, _) = intake::normalize(
            vec![RawFile::new("a.jpg", "image/jpeg", b"a".to_vec())],
            &previews,
            || 1,
        );
        let id = items[0].id;

        let errored = with_status(&items, id, ItemStatus::Errored {
            message: "x".into(),
        });
        assert!(errored[0].source.is_some());

        let done = with_status(&items, id, ItemStatus::Completed {
            remote_key: "k".into(),
            remote_url: "u".into(),
        });
        assert!(done[0].source.is_none());
        assert!(items[0].source.is_some());
    }

    #[tokio::test]
    async fn test_process_queue_is_single_flight() {
        let pipeline = pipeline();
        pipeline.shared.store.set_put_duration(Duration::from_millis(50)).await;
        pipeline
            .add_files(vec![RawFile::new("a.jpg", "image/jpeg", fixtures::jpeg_bytes(8, 8, 80))])
            .await
            .unwrap();

        // add_files already started the worker.
        let started: Vec<bool> = (0..10).map(|_| pipeline.process_queue()).collect();
        assert!(started.iter().all(|s| !s));

        pipeline.wait_idle().await;
        assert_eq!(pipeline.shared.store.put_count().await, 1);
    }

    #[tokio::test]
    async fn test_retry_rejects_non_errored() {
        let pipeline = pipeline();
        let report = pipeline
            .add_files(vec![RawFile::new("a.jpg", "image/jpeg", b"a".to_vec())])
            .await
            .unwrap();
        pipeline.wait_idle().await;

        let id = report.accepted[0];
        let err = pipeline.retry(id).await.unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidTransition {
                id,
                from: "completed",
                action: "retry",
            }
        );
        assert!(matches!(
            pipeline.retry(ItemId::new()).await,
            Err(PipelineError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_load_existing_keeps_single_featured() {
        let pipeline = pipeline();
        let ids = pipeline
            .load_existing(vec![
                fixtures::existing_image("property-7/1-a.jpg", true),
                fixtures::existing_image("property-7/2-b.jpg", true),
            ])
            .await
            .unwrap();

        let items = pipeline.items().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_featured);
        assert!(!items[1].is_featured);
        assert_eq!(pipeline.featured().await, Some(ids[0]));
        assert_eq!(pipeline.previews().outstanding(), 0);
    }

    #[tokio::test]
    async fn test_operations_after_shutdown() {
        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let pipeline = UploadPipeline::new(
            "owner",
            MockObjectStore::new(),
            MockCompressor::new(),
            PublisherConfig::default().with_debounce(Duration::from_millis(10)),
            Arc::new(move |_| *counter.lock().unwrap() += 1),
        );
        pipeline.shutdown().await;
        pipeline.shutdown().await;

        let result = pipeline
            .add_files(vec![RawFile::new("a.jpg", "image/jpeg", b"a".to_vec())])
            .await;
        assert_eq!(result.unwrap_err(), PipelineError::ShutDown);
        assert!(!pipeline.process_queue());
        assert_eq!(
            pipeline.set_featured(ItemId::new()).await.unwrap_err(),
            PipelineError::ShutDown
        );
        pipeline.wait_idle().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*seen.lock().unwrap(), 0);
        assert_eq!(pipeline.previews().outstanding(), 0);
    }
}
