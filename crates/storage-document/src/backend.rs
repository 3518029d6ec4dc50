//! MongoDB-backed implementation of [`StorageBackend`].
//!
//! Namespaces map to databases and collections map to collections of the same
//! name. Each stored entry is one `{key, value}` document; a unique index on
//! `key` is (re)asserted before every read and write.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use mongodb::{
    Client, Collection, IndexModel,
    bson::{Document, doc},
    options::{ClientOptions, IndexOptions, UpdateOptions},
};
use portcullis_storage::{StorageBackend, StorageError, StorageResult, namespace};

use crate::{
    config::DocumentBackendConfig,
    error::{DocumentStorageError, Result, is_index_exists},
    value::{self, KEY_FIELD},
};

/// Database used for connectivity checks.
const ADMIN_DATABASE: &str = "admin";

/// Document-store storage backend.
///
/// The driver's [`Client`] pools connections internally; clones of the
/// backend share the pool and the closed state.
#[derive(Clone)]
pub struct DocumentBackend {
    client: Client,
    closed: Arc<AtomicBool>,
}

impl DocumentBackend {
    /// Connects using the configured URI and pings the `admin` database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the server cannot be reached
    /// within the connect timeout, or [`StorageError::InvalidArgument`] for a
    /// malformed connection string.
    pub async fn connect(config: &DocumentBackendConfig) -> StorageResult<Self> {
        let timeout = config.connect_timeout();
        let connect = async {
            let mut options = ClientOptions::parse(config.uri()).await?;
            options.connect_timeout = Some(timeout);
            options.server_selection_timeout = Some(timeout);
            let hosts: Vec<String> = options.hosts.iter().map(ToString::to_string).collect();
            let client = Client::with_options(options)?;
            client.database(ADMIN_DATABASE).run_command(doc! { "ping": 1 }, None).await?;
            Ok::<_, DocumentStorageError>((client, hosts))
        };
        // Parsing a mongodb+srv URI resolves DNS, which the driver timeouts
        // do not cover.
        let (client, hosts) = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| DocumentStorageError::ConnectTimeout(timeout))??;

        tracing::info!(?hosts, "connected to document store");
        Ok(Self::from_client(client))
    }

    /// Wraps an already-configured driver client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client, closed: Arc::new(AtomicBool::new(false)) }
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::connection("document backend is closed"));
        }
        Ok(())
    }

    fn collection(&self, namespace: &str, collection: &str) -> StorageResult<Collection<Document>> {
        self.ensure_open()?;
        Ok(self.client.database(namespace::normalize(namespace)).collection(collection))
    }

    /// Creates the unique `key` index, tolerating "already exists" conflicts.
    async fn ensure_key_index(&self, coll: &Collection<Document>) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { KEY_FIELD: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match coll.create_index(index, None).await {
            Ok(_) => Ok(()),
            Err(err) if is_index_exists(&err) => {
                tracing::warn!(
                    collection = %coll.namespace(),
                    error = %err,
                    "key index already exists with different options"
                );
                Ok(())
            },
            Err(err) => Err(err.into()),
        }
    }
}

impl std::fmt::Debug for DocumentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBackend")
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StorageBackend for DocumentBackend {
    #[tracing::instrument(skip(self))]
    async fn get(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<Bytes> {
        let coll = self.collection(namespace, collection)?;
        self.ensure_key_index(&coll).await?;
        let document = coll
            .find_one(value::key_filter(key), None)
            .await
            .map_err(DocumentStorageError::from)?
            .ok_or_else(|| StorageError::not_found(key))?;
        Ok(Bytes::from(value::decode(key, &document)?))
    }

    #[tracing::instrument(skip(self, value), fields(value_len = value.len()))]
    async fn set(
        &self,
        namespace: &str,
        collection: &str,
        key: &str,
        value: Vec<u8>,
    ) -> StorageResult<()> {
        let coll = self.collection(namespace, collection)?;
        self.ensure_key_index(&coll).await?;
        coll.update_one(
            value::key_filter(key),
            value::upsert_update(key, value),
            UpdateOptions::builder().upsert(true).build(),
        )
        .await
        .map_err(DocumentStorageError::from)?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<()> {
        let result = self
            .collection(namespace, collection)?
            .delete_one(value::key_filter(key), None)
            .await
            .map_err(DocumentStorageError::from)?;
        if result.deleted_count == 0 {
            return Err(StorageError::not_found(key));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<bool> {
        let count = self
            .collection(namespace, collection)?
            .count_documents(value::key_filter(key), None)
            .await
            .map_err(DocumentStorageError::from)?;
        Ok(count > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn ping(&self) -> StorageResult<()> {
        self.ensure_open()?;
        self.client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(DocumentStorageError::from)?;
        Ok(())
    }

    /// Marks the backend closed and shuts the driver client down. Later
    /// calls fail with [`StorageError::Connection`]; closing twice is a no-op.
    #[tracing::instrument(skip(self))]
    async fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.client.clone().shutdown().await;
        tracing::debug!("document backend closed");
        Ok(())
    }
}
