//! Unified backend enum.
//!
//! [`Backend`] wraps every storage backend so the rest of the service holds a
//! single concrete type chosen at runtime while keeping static dispatch.

use async_trait::async_trait;
use bytes::Bytes;
use portcullis_storage::{MemoryBackend, StorageBackend, StorageResult};
use portcullis_storage_cache::CacheBackend;
use portcullis_storage_document::DocumentBackend;
use portcullis_storage_file::FileBackend;

use crate::config::{BackendConfig, BackendKind};

/// The storage backend selected by configuration.
#[derive(Clone)]
pub enum Backend {
    /// In-memory backend for testing and development.
    Memory(MemoryBackend),
    /// Embedded-file backend.
    File(FileBackend),
    /// Remote-cache backend.
    Cache(CacheBackend),
    /// Document-store backend.
    Document(DocumentBackend),
}

macro_rules! delegate {
    ($self:ident, $backend:ident => $call:expr) => {
        match $self {
            Self::Memory($backend) => $call,
            Self::File($backend) => $call,
            Self::Cache($backend) => $call,
            Self::Document($backend) => $call,
        }
    };
}

impl Backend {
    /// Builds the backend described by `config`.
    ///
    /// Remote backends connect and ping before returning, so a misconfigured
    /// deployment fails at startup rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`](portcullis_storage::StorageError::Connection)
    /// if the backend cannot be reached or its storage directory cannot be
    /// created, and `InvalidArgument` for malformed connection URIs.
    pub async fn connect(config: &BackendConfig) -> StorageResult<Self> {
        let backend = match config {
            BackendConfig::Memory => Self::Memory(MemoryBackend::new()),
            BackendConfig::File(file) => Self::File(FileBackend::open(file.clone())?),
            BackendConfig::Cache(cache) => Self::Cache(CacheBackend::connect(cache).await?),
            BackendConfig::Document(document) => {
                Self::Document(DocumentBackend::connect(document).await?)
            },
        };
        tracing::info!(backend = %backend.kind(), "storage backend selected");
        Ok(backend)
    }

    /// Creates a memory backend.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryBackend::new())
    }

    /// Returns which kind of backend this is.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Memory(_) => BackendKind::Memory,
            Self::File(_) => BackendKind::File,
            Self::Cache(_) => BackendKind::Cache,
            Self::Document(_) => BackendKind::Document,
        }
    }
}

#[async_trait]
impl StorageBackend for Backend {
    async fn get(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<Bytes> {
        delegate!(self, b => b.get(namespace, collection, key).await)
    }

    async fn set(
        &self,
        namespace: &str,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<()> {
        delegate!(self, b => b.set(namespace, collection, key, value).await)
    }

    async fn delete(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<()> {
        delegate!(self, b => b.delete(namespace, collection, key).await)
    }

    async fn exists(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<bool> {
        delegate!(self, b => b.exists(namespace, collection, key).await)
    }

    async fn ping(&self) -> StorageResult<()> {
        delegate!(self, b => b.ping().await)
    }

    async fn close(&self) -> StorageResult<()> {
        delegate!(self, b => b.close().await)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Backend::{}", self.kind())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use portcullis_storage_file::FileBackendConfig;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_memory_backend_via_enum() {
        let backend = Backend::connect(&BackendConfig::Memory).await.expect("connect");
        assert_eq!(backend.kind(), BackendKind::Memory);

        backend.set("acme", "cards", "12345", b"card".to_vec()).await.expect("set");
        assert_eq!(backend.get("acme", "cards", "12345").await.expect("get").as_ref(), b"card");
    }

    #[tokio::test]
    async fn test_file_backend_via_enum() {
        let dir = TempDir::new().expect("tempdir");
        let config = BackendConfig::File(FileBackendConfig::new(dir.path()));
        let backend = Backend::connect(&config).await.expect("connect");
        assert_eq!(backend.kind(), BackendKind::File);

        backend.set("", "devices", "d1", b"{}".to_vec()).await.expect("set");
        assert!(backend.exists("default", "devices", "d1").await.expect("exists"));
        backend.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_debug_impl() {
        assert_eq!(format!("{:?}", Backend::memory()), "Backend::memory");
    }
}
