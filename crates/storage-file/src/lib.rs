//! Embedded-file storage backend for Portcullis.
//!
//! [`FileBackend`] implements [`StorageBackend`](portcullis_storage::StorageBackend)
//! on top of [redb](https://docs.rs/redb). Each namespace lives in its own
//! database file under the configured directory and each collection is a
//! table inside that file:
//!
//! ```no_run
//! use portcullis_storage::StorageBackend;
//! use portcullis_storage_file::{FileBackend, FileBackendConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = FileBackend::open(FileBackendConfig::new("/var/lib/portcullis"))?;
//! backend.set("acme", "cards", "12345", b"{}".to_vec()).await?;
//! backend.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Fail points
//!
//! With the `failpoints` feature enabled the backend exposes:
//!
//! - `file-backend-before-commit`: fails a `set` after the write but before commit
//! - `file-backend-release-handle`: fails releasing a namespace handle during `close`

#![deny(unsafe_code)]

mod backend;
mod config;
pub mod error;

pub use backend::{FileBackend, NAMESPACE_FILE_EXTENSION};
pub use config::FileBackendConfig;
pub use error::FileStorageError;
