//! Remote object storage.
//!
//! This module provides the `ObjectStore` trait the pipeline uploads
//! through, the remote key format, and an HTTP adapter for a
//! Supabase-style storage REST API.
//!
//! Keys are `{owner_id}/{timestamp_millis}-{random_token}.{extension}`;
//! uniqueness comes from construction, collisions are not checked.
//!
//! # Example
//!
//! ```ignore
//! use gallery_core::store::{build_remote_key, HttpObjectStore, ObjectStore, StorageConfig};
//!
//! let store = HttpObjectStore::new(config)?;
//! let key = build_remote_key("property-42", "pool.jpg", "image/jpeg");
//! store.put(&key, bytes, "image/jpeg").await?;
//! println!("{}", store.public_url(&key).await);
//! ```

mod config;
mod error;
mod http;
mod key;
mod traits;

pub use config::StorageConfig;
pub use error::StoreError;
pub use http::HttpObjectStore;
pub use key::{build_remote_key, extension_for};
pub use traits::ObjectStore;
