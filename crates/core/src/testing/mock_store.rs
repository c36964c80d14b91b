//! Mock object store for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::store::{ObjectStore, StoreError};

/// A recorded put for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub content_type: String,
    pub body: Bytes,
    /// Whether the put succeeded.
    pub success: bool,
}

/// A recorded delete for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDelete {
    pub key: String,
    pub success: bool,
}

/// Mock implementation of the ObjectStore trait.
///
/// Clones share state, so a test can hand one clone to the pipeline and
/// inspect another. Provides controllable behavior for testing:
/// - Track puts and deletes for assertions
/// - Fail the next put, or every delete
/// - Simulate upload latency
/// - Track how many puts were in flight at once
///
/// # Example
///
/// ```rust,ignore
/// use gallery_core::testing::MockObjectStore;
///
/// let store = MockObjectStore::new();
/// store.set_next_put_error(StoreError::Timeout).await;
///
/// // ... run the pipeline with store.clone() ...
///
/// let puts = store.recorded_puts().await;
/// assert!(!puts[0].success);
/// ```
#[derive(Debug, Clone)]
pub struct MockObjectStore {
    /// Objects currently stored, by key.
    objects: Arc<RwLock<HashMap<String, Bytes>>>,
    puts: Arc<RwLock<Vec<RecordedPut>>>,
    deletes: Arc<RwLock<Vec<RecordedDelete>>>,
    /// If set, the next put will fail with this error.
    next_put_error: Arc<RwLock<Option<StoreError>>>,
    /// If set, every delete fails with this error.
    delete_error: Arc<RwLock<Option<StoreError>>>,
    /// Simulated put duration in milliseconds.
    put_duration_ms: Arc<RwLock<u64>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectStore {
    /// Create a new mock store with instant puts.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            puts: Arc::new(RwLock::new(Vec::new())),
            deletes: Arc::new(RwLock::new(Vec::new())),
            next_put_error: Arc::new(RwLock::new(None)),
            delete_error: Arc::new(RwLock::new(None)),
            put_duration_ms: Arc::new(RwLock::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded puts, in call order.
    pub async fn recorded_puts(&self) -> Vec<RecordedPut> {
        self.puts.read().await.clone()
    }

    /// Get the number of puts attempted.
    pub async fn put_count(&self) -> usize {
        self.puts.read().await.len()
    }

    /// Get all recorded deletes, in call order.
    pub async fn recorded_deletes(&self) -> Vec<RecordedDelete> {
        self.deletes.read().await.clone()
    }

    /// Get the number of deletes attempted.
    pub async fn delete_count(&self) -> usize {
        self.deletes.read().await.len()
    }

    /// Whether an object is currently stored under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Number of objects currently stored.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Configure the next put to fail with the given error.
    pub async fn set_next_put_error(&self, error: StoreError) {
        *self.next_put_error.write().await = Some(error);
    }

    /// Make every delete fail with the given error, or succeed again with `None`.
    pub async fn set_delete_error(&self, error: Option<StoreError>) {
        *self.delete_error.write().await = error;
    }

    /// Set the simulated put duration.
    pub async fn set_put_duration(&self, duration: Duration) {
        *self.put_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Highest number of puts observed running concurrently.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Seed an object as if it had been uploaded earlier.
    pub async fn insert_object(&self, key: &str, body: impl Into<Bytes>) {
        self.objects.write().await.insert(key.to_string(), body.into());
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let duration_ms = *self.put_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        let result = match self.next_put_error.write().await.take() {
            Some(err) => Err(err),
            None => {
                self.objects
                    .write()
                    .await
                    .insert(key.to_string(), body.clone());
                Ok(())
            }
        };

        self.puts.write().await.push(RecordedPut {
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
            success: result.is_ok(),
        });
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn public_url(&self, key: &str) -> String {
        format!("https://mock.storage/public/{}", key)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let result = match self.delete_error.read().await.clone() {
            Some(err) => Err(err),
            None => {
                self.objects.write().await.remove(key);
                Ok(())
            }
        };

        self.deletes.write().await.push(RecordedDelete {
            key: key.to_string(),
            success: result.is_ok(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_records_and_stores() {
        let store = MockObjectStore::new();
        store
            .put("o/1-a.jpg", Bytes::from_static(b"jpeg"), "image/jpeg")
            .await
            .unwrap();

        let puts = store.recorded_puts().await;
        assert_eq!(puts.len(), 1);
        assert!(puts[0].success);
        assert_eq!(puts[0].content_type, "image/jpeg");
        assert!(store.contains("o/1-a.jpg").await);
        assert_eq!(
            store.public_url("o/1-a.jpg").await,
            "https://mock.storage/public/o/1-a.jpg"
        );
    }

    #[tokio::test]
    async fn test_next_put_error_applies_once() {
        let store = MockObjectStore::new();
        store.set_next_put_error(StoreError::Timeout).await;

        let first = store.put("o/a", Bytes::new(), "image/png").await;
        let second = store.put("o/b", Bytes::new(), "image/png").await;

        assert!(matches!(first, Err(StoreError::Timeout)));
        assert!(second.is_ok());
        assert!(!store.contains("o/a").await);
        assert_eq!(store.put_count().await, 2);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_object() {
        let store = MockObjectStore::new();
        store.insert_object("o/a", b"x".to_vec()).await;
        store
            .set_delete_error(Some(StoreError::ConnectionFailed("down".into())))
            .await;

        assert!(store.delete("o/a").await.is_err());
        assert!(store.contains("o/a").await);

        store.set_delete_error(None).await;
        assert!(store.delete("o/a").await.is_ok());
        assert_eq!(store.object_count().await, 0);
        assert_eq!(store.delete_count().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MockObjectStore::new();
        let handle = store.clone();
        handle.put("o/a", Bytes::new(), "image/png").await.unwrap();
        assert_eq!(store.put_count().await, 1);
        assert_eq!(store.max_in_flight(), 1);
    }
}
