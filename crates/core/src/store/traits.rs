//! Trait definitions for the store module.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::StoreError;

/// Durable binary storage addressed by key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Stores `body` under `key`.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError>;

    /// Resolves the public URL of a stored object.
    async fn public_url(&self, key: &str) -> String;

    /// Deletes an object. Callers treat failure as non-fatal.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
