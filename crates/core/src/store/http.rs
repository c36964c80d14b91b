//! HTTP object store for a Supabase-style storage REST API.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ObjectStore, StorageConfig, StoreError};

/// Error body returned by the storage service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Object store backed by the storage service's REST endpoints.
pub struct HttpObjectStore {
    client: Client,
    config: StorageConfig,
}

impl HttpObjectStore {
    /// Create a new store client.
    pub fn new(config: StorageConfig) -> Result<Self, StoreError> {
        if config.url.trim().is_empty() {
            return Err(StoreError::InvalidConfig("storage url is empty".to_string()));
        }
        if config.bucket.trim().is_empty() {
            return Err(StoreError::InvalidConfig("storage bucket is empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Percent-encodes each path segment of a key.
    fn encode_key(key: &str) -> String {
        key.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Authenticated endpoint for a single object.
    pub fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url(),
            self.config.bucket,
            Self::encode_key(key)
        )
    }

    /// Public, unauthenticated URL for a single object.
    pub fn public_object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url(),
            self.config.bucket,
            Self::encode_key(key)
        )
    }

    /// Turns a non-success response into a store error.
    async fn status_error(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| body.chars().take(200).collect());
        StoreError::Status { status, message }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let url = self.object_url(key);
        debug!(key = %key, size_bytes = body.len(), "Uploading object");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .header("content-type", content_type)
            .header(
                "cache-control",
                format!("max-age={}", self.config.cache_control_secs),
            )
            .header("x-upsert", "false")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(())
    }

    async fn public_url(&self, key: &str) -> String {
        self.public_object_url(key)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url(), self.config.bucket);
        debug!(key = %key, "Deleting object");

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.config.api_key)
            .header("apikey", &self.config.api_key)
            .json(&json!({ "prefixes": [key] }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(())
    }
}
