//! Revocable local preview handles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tracing::warn;

/// A locally allocated display reference for a selected file.
///
/// Handles are plain values; liveness is tracked by the [`PreviewRegistry`]
/// that allocated them. Each handle must be revoked exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    id: u64,
    uri: String,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// URI the owner can hand to its display layer.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Allocates preview handles and keeps the bytes they display alive until revoked.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, Bytes>>,
    revoked: AtomicU64,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, HashMap<u64, Bytes>> {
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Allocates a new handle displaying `bytes`.
    pub fn allocate(&self, file_name: &str, bytes: Bytes) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.live().insert(id, bytes);
        PreviewHandle {
            id,
            uri: format!("preview://{}/{}", id, urlencoding::encode(file_name)),
        }
    }

    /// Returns the bytes behind a live handle.
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<Bytes> {
        self.live().get(&handle.id).cloned()
    }

    /// Revokes a handle. Returns `false` if it was already revoked.
    pub fn revoke(&self, handle: &PreviewHandle) -> bool {
        if self.live().remove(&handle.id).is_some() {
            self.revoked.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            warn!(preview_id = handle.id, "Preview handle revoked twice");
            false
        }
    }

    /// Revokes every outstanding handle, returning how many were live.
    pub fn revoke_all(&self) -> usize {
        let drained = {
            let mut live = self.live();
            let count = live.len();
            live.clear();
            count
        };
        self.revoked.fetch_add(drained as u64, Ordering::Relaxed);
        drained
    }

    /// Number of handles allocated and not yet revoked.
    pub fn outstanding(&self) -> usize {
        self.live().len()
    }

    /// Total handles allocated over the registry's lifetime.
    pub fn allocated_total(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }

    /// Total successful revocations over the registry's lifetime.
    pub fn revoked_total(&self) -> u64 {
        self.revoked.load(Ordering::Relaxed)
    }
}
