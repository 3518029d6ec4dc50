//! Shared storage abstraction for Portcullis services.
//!
//! This crate provides the [`StorageBackend`] trait and the types every
//! backend shares: the error taxonomy, namespace normalization, and per-call
//! deadlines. The access-decision engine and the HTTP layer talk to storage
//! only through this trait, so the configured backend can be swapped without
//! touching them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Verification / HTTP layer                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   Repository layer                          │
//! │        (cards and devices as JSON records)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 portcullis-storage                          │
//! │              StorageBackend trait                           │
//! │   get, set, delete, exists  (namespace, collection, key)    │
//! ├──────────────┬──────────────┬───────────────┬───────────────┤
//! │ FileBackend  │ CacheBackend │DocumentBackend│ MemoryBackend │
//! │   (redb)     │   (redis)    │  (MongoDB)    │   (testing)   │
//! └──────────────┴──────────────┴───────────────┴───────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use portcullis_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set("acme", "cards", "12345", b"{}".to_vec()).await?;
//!     let value = backend.get("acme", "cards", "12345").await?;
//!     assert_eq!(value.as_ref(), b"{}");
//!
//!     // Missing keys are reported as NotFound, not as an empty value.
//!     let err = backend.get("acme", "cards", "99999").await.unwrap_err();
//!     assert!(err.is_not_found());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Available Backends
//!
//! | Backend | Crate | Persistence |
//! |---------|-------|-------------|
//! | [`MemoryBackend`] | this crate | No |
//! | `FileBackend` | `portcullis-storage-file` | Yes, one file per namespace |
//! | `CacheBackend` | `portcullis-storage-cache` | Depends on server |
//! | `DocumentBackend` | `portcullis-storage-document` | Yes |
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the [`testutil`] and [`conformance`] modules (data generators,
//!   assertion macros, and the backend conformance suite).
//! - **`failpoints`**: Activates `fail` fail points in backends for fault-injection tests.

#![deny(unsafe_code)]

pub mod backend;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod conformance;
pub mod context;
pub mod error;
pub mod memory;
pub mod namespace;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;

// Re-export primary types at crate root for convenience
pub use backend::StorageBackend;
pub use bytes::Bytes;
pub use context::CallContext;
pub use error::{BoxError, StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use namespace::DEFAULT_NAMESPACE;
pub use tokio_util::sync::CancellationToken;
