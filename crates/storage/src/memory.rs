//! In-memory storage backend implementation.
//!
//! This module provides [`MemoryBackend`], an in-memory implementation of
//! [`StorageBackend`] suitable for testing and development.
//!
//! # Features
//!
//! - **Thread-safe**: Uses [`parking_lot::RwLock`] for concurrent access
//! - **Same semantics as persistent backends**: missing collections behave like
//!   missing keys, `delete` of an absent key reports `NotFound`
//! - **Fault injection**: with the `failpoints` feature, `memory-backend-get` and
//!   `memory-backend-set` make the respective call fail with a `Connection` error
//!
//! # Example
//!
//! ```
//! use portcullis_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set("", "cards", "12345", b"hello".to_vec()).await.unwrap();
//!     let value = backend.get("default", "cards", "12345").await.unwrap();
//!
//!     assert_eq!(value.as_ref(), b"hello");
//! }
//! ```
//!
//! # Limitations
//!
//! - Data is not persisted; all data is lost when the process exits
//! - `close` is a no-op; the backend stays usable afterwards

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use fail::fail_point;
use parking_lot::RwLock;

use crate::{
    backend::StorageBackend,
    error::{StorageError, StorageResult},
    namespace,
};

type Collections = HashMap<String, HashMap<String, Bytes>>;

/// In-memory storage backend.
///
/// # Cloning
///
/// `MemoryBackend` is cheaply cloneable via [`Arc`]. All clones share the
/// same underlying data.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<HashMap<String, Collections>>>,
}

impl MemoryBackend {
    /// Creates a new, empty in-memory storage backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys stored across every namespace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().values().flat_map(HashMap::values).map(HashMap::len).sum()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend").field("keys", &self.len()).finish()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    #[tracing::instrument(skip(self))]
    async fn get(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<Bytes> {
        fail_point!("memory-backend-get", |_| {
            Err(StorageError::connection("injected failure in memory-backend-get"))
        });
        let data = self.data.read();
        data.get(namespace::normalize(namespace))
            .and_then(|collections| collections.get(collection))
            .and_then(|entries| entries.get(key))
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }

    #[tracing::instrument(skip(self, value), fields(value_len = value.len()))]
    async fn set(
        &self,
        namespace: &str,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<()> {
        fail_point!("memory-backend-set", |_| {
            Err(StorageError::connection("injected failure in memory-backend-set"))
        });
        let mut data = self.data.write();
        data.entry(namespace::normalize(namespace).to_owned())
            .or_default()
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), Bytes::from(value));
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<()> {
        let mut data = self.data.write();
        data.get_mut(namespace::normalize(namespace))
            .and_then(|collections| collections.get_mut(collection))
            .and_then(|entries| entries.remove(key))
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(key))
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<bool> {
        let data = self.data.read();
        Ok(data
            .get(namespace::normalize(namespace))
            .and_then(|collections| collections.get(collection))
            .is_some_and(|entries| entries.contains_key(key)))
    }

    #[tracing::instrument(skip(self))]
    async fn ping(&self) -> StorageResult<()> {
        // Healthy as long as the map lock can be taken.
        let _guard = self.data.read();
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}
