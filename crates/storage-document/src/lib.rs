//! Document-store storage backend for Portcullis.
//!
//! [`DocumentBackend`] maps each namespace to a MongoDB database and each
//! collection to a MongoDB collection of `{key, value}` documents.
//!
//! ```no_run
//! use portcullis_storage::StorageBackend;
//! use portcullis_storage_document::{DocumentBackend, DocumentBackendConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DocumentBackendConfig::builder().uri("mongodb://localhost:27017").build();
//! let backend = DocumentBackend::connect(&config).await?;
//! backend.set("acme", "cards", "12345", b"{}".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod backend;
mod config;
pub mod error;
pub mod value;

pub use backend::DocumentBackend;
pub use config::{DEFAULT_CONNECT_TIMEOUT, DocumentBackendConfig};
pub use error::DocumentStorageError;
