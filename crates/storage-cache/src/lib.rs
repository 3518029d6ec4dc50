//! Remote-cache storage backend for Portcullis.
//!
//! [`CacheBackend`] stores every `(namespace, collection, key)` triple as a
//! single redis string under `namespace:collection:key`. It is suited to
//! deployments that already run a cache server and want verification data
//! shared across several gateway instances.
//!
//! ```no_run
//! use portcullis_storage::StorageBackend;
//! use portcullis_storage_cache::{CacheBackend, CacheBackendConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CacheBackendConfig::builder().uri("redis://localhost:6379/0").build()?;
//! let backend = CacheBackend::connect(&config).await?;
//! backend.set("acme", "cards", "12345", b"{}".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod backend;
mod config;
pub mod error;
pub mod uri;

pub use backend::{CacheBackend, storage_key};
pub use config::{CacheBackendConfig, DEFAULT_CONNECT_TIMEOUT};
pub use error::CacheStorageError;
pub use uri::CacheUri;
