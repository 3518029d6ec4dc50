//! redis-backed implementation of [`StorageBackend`].

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use portcullis_storage::{StorageBackend, StorageError, StorageResult, namespace};
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    config::CacheBackendConfig,
    error::{CacheStorageError, Result},
    uri::CacheUri,
};

/// Synthesizes the flat server key for a `(namespace, collection, key)` triple.
///
/// An empty namespace maps to the default namespace.
#[must_use]
pub fn storage_key(namespace: &str, collection: &str, key: &str) -> String {
    format!("{}:{collection}:{key}", namespace::normalize(namespace))
}

/// Remote-cache storage backend.
///
/// All operations share one auto-reconnecting [`ConnectionManager`]; clones
/// of the backend share it too. Values are stored without expiry.
#[derive(Clone)]
pub struct CacheBackend {
    conn: ConnectionManager,
    uri: CacheUri,
    closed: Arc<AtomicBool>,
}

impl CacheBackend {
    /// Connects to the configured server and verifies it answers `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidArgument`] for a malformed URI and
    /// [`StorageError::Connection`] if the server cannot be reached within
    /// the connect timeout.
    pub async fn connect(config: &CacheBackendConfig) -> StorageResult<Self> {
        Ok(Self::connect_inner(config).await?)
    }

    async fn connect_inner(config: &CacheBackendConfig) -> Result<Self> {
        let uri = config.parsed_uri()?;
        let client = redis::Client::open(uri.to_connection_info())?;

        let connect = async {
            let mut conn = ConnectionManager::new(client).await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, CacheStorageError>(conn)
        };
        let conn = tokio::time::timeout(config.connect_timeout(), connect)
            .await
            .map_err(|_| CacheStorageError::ConnectTimeout(config.connect_timeout()))??;

        tracing::info!(uri = %uri, "connected to cache server");
        Ok(Self { conn, uri, closed: Arc::new(AtomicBool::new(false)) })
    }

    /// Returns the server address (credentials masked on display).
    #[must_use]
    pub fn uri(&self) -> &CacheUri {
        &self.uri
    }

    fn connection(&self) -> StorageResult<ConnectionManager> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::connection("cache backend is closed"));
        }
        Ok(self.conn.clone())
    }
}

impl std::fmt::Debug for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBackend")
            .field("uri", &self.uri)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

#[async_trait]
impl StorageBackend for CacheBackend {
    #[tracing::instrument(skip(self))]
    async fn get(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<Bytes> {
        let mut conn = self.connection()?;
        let value: Option<Vec<u8>> = conn
            .get(storage_key(namespace, collection, key))
            .await
            .map_err(CacheStorageError::from)?;
        value.map(Bytes::from).ok_or_else(|| StorageError::not_found(key))
    }

    #[tracing::instrument(skip(self, value), fields(value_len = value.len()))]
    async fn set(
        &self,
        namespace: &str,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<()> {
        let mut conn = self.connection()?;
        let _: () = conn
            .set(storage_key(namespace, collection, key), value)
            .await
            .map_err(CacheStorageError::from)?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<()> {
        let mut conn = self.connection()?;
        let removed: i64 = conn
            .del(storage_key(namespace, collection, key))
            .await
            .map_err(CacheStorageError::from)?;
        if removed == 0 {
            return Err(StorageError::not_found(key));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<bool> {
        let mut conn = self.connection()?;
        let found: bool = conn
            .exists(storage_key(namespace, collection, key))
            .await
            .map_err(CacheStorageError::from)?;
        Ok(found)
    }

    #[tracing::instrument(skip(self))]
    async fn ping(&self) -> StorageResult<()> {
        let mut conn = self.connection()?;
        let _: String =
            redis::cmd("PING").query_async(&mut conn).await.map_err(CacheStorageError::from)?;
        Ok(())
    }

    /// Marks the backend closed. The connection is released once the last
    /// clone is dropped.
    async fn close(&self) -> StorageResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(uri = %self.uri, "cache backend closed");
        }
        Ok(())
    }
}
