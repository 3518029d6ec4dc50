//! Storage backend trait definition.
//!
//! This module defines the [`StorageBackend`] trait, the single contract every
//! Portcullis storage implementation satisfies: the embedded-file backend, the
//! remote-cache backend, the document-store backend, and the in-memory
//! backend used for testing.
//!
//! # Addressing
//!
//! Records are addressed by `(namespace, collection, key)`:
//!
//! - **namespace** — top-level partition (tenant/organization). Empty means
//!   [`DEFAULT_NAMESPACE`](crate::namespace::DEFAULT_NAMESPACE).
//! - **collection** — secondary partition within a namespace (entity type).
//! - **key** — unique within its `(namespace, collection)`.
//!
//! Values are opaque bytes. Identifiers are case-sensitive and are never
//! transformed beyond the empty-namespace rewrite.
//!
//! # Implementing a Backend
//!
//! 1. Implement [`StorageBackend`], rewriting the namespace with
//!    [`namespace::normalize`](crate::namespace::normalize) first.
//! 2. Map backend-specific errors to [`StorageError`](crate::StorageError),
//!    keeping the native error as the source.
//! 3. Run the [`conformance`](crate::conformance) suite against it.
//!
//! See [`MemoryBackend`](crate::MemoryBackend) for a reference implementation.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageResult;

/// Abstract storage backend for namespaced key-value operations.
///
/// Backends are `Send + Sync` and safe to share between concurrent requests.
/// No operation is atomic across keys.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](StorageBackend::get) | Read a value, or `NotFound` |
/// | [`set`](StorageBackend::set) | Create or fully replace a value |
/// | [`delete`](StorageBackend::delete) | Remove a value, or `NotFound` |
/// | [`exists`](StorageBackend::exists) | Test for presence |
/// | [`ping`](StorageBackend::ping) | Verify the backend is reachable |
/// | [`close`](StorageBackend::close) | Release connections and handles |
///
/// # Example
///
/// ```
/// use portcullis_storage::{MemoryBackend, StorageBackend};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let backend = MemoryBackend::new();
///
/// backend.set("acme", "devices", "SN-001", b"{\"active\":true}".to_vec()).await.unwrap();
/// let value = backend.get("acme", "devices", "SN-001").await.unwrap();
/// assert_eq!(&value[..], b"{\"active\":true}");
/// # });
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if
    /// the key or its collection does not exist.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn get(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<Bytes>;

    /// Stores `value` under `key`, replacing any previous value entirely.
    ///
    /// The collection is created on demand.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn set(
        &self,
        namespace: &str,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<()>;

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if
    /// the key or its collection does not exist, including when the key was
    /// already deleted.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn delete(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<()>;

    /// Returns `true` if `key` exists. A missing collection is not an error.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn exists(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<bool>;

    /// Verifies that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`](crate::StorageError::Connection)
    /// when it is not.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn ping(&self) -> StorageResult<()>;

    /// Releases every connection or handle owned by the backend.
    ///
    /// Release is best-effort: a failure on one handle does not stop the
    /// others from being released. The first failure is returned.
    async fn close(&self) -> StorageResult<()>;
}

#[async_trait]
impl<B> StorageBackend for std::sync::Arc<B>
where
    B: StorageBackend + ?Sized,
{
    async fn get(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<Bytes> {
        (**self).get(namespace, collection, key).await
    }

    async fn set(
        &self,
        namespace: &str,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<()> {
        (**self).set(namespace, collection, key, value).await
    }

    async fn delete(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<()> {
        (**self).delete(namespace, collection, key).await
    }

    async fn exists(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<bool> {
        (**self).exists(namespace, collection, key).await
    }

    async fn ping(&self) -> StorageResult<()> {
        (**self).ping().await
    }

    async fn close(&self) -> StorageResult<()> {
        (**self).close().await
    }
}
