//! redb-backed implementation of [`StorageBackend`].
//!
//! # Layout
//!
//! ```text
//! <dir>/
//!   default.redb      namespace "" and "default"
//!   acme.redb         namespace "acme"
//!     table "cards"     key -> value bytes
//!     table "devices"
//! ```
//!
//! Each namespace file is opened lazily on first use and the handle is kept
//! until [`FileBackend::close`]. redb holds an exclusive lock on an open
//! file, so a namespace must never be opened twice by the same process; the
//! handle map is guarded with double-checked locking to keep concurrent first
//! access to a namespace down to a single open.
//!
//! redb is a synchronous engine. Every operation runs on the blocking pool via
//! [`tokio::task::spawn_blocking`].

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use fail::fail_point;
use parking_lot::RwLock;
use portcullis_storage::{StorageBackend, StorageError, StorageResult, namespace};
use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::{
    config::FileBackendConfig,
    error::{FileStorageError, Result},
};

/// Extension of every namespace file.
pub const NAMESPACE_FILE_EXTENSION: &str = "redb";

/// redb rejects empty table names, so an empty collection is refused up front.
fn table(collection: &str) -> Result<TableDefinition<'_, &'static str, &'static [u8]>> {
    if collection.is_empty() {
        return Err(FileStorageError::InvalidCollection);
    }
    Ok(TableDefinition::new(collection))
}

/// Embedded-file storage backend with one redb database per namespace.
///
/// Cloning is cheap; clones share the open handles and the closed state.
#[derive(Clone)]
pub struct FileBackend {
    inner: Arc<Inner>,
}

struct Inner {
    dir: PathBuf,
    handles: RwLock<HashMap<String, Arc<Database>>>,
    closed: AtomicBool,
}

impl FileBackend {
    /// Opens a backend rooted at the configured directory, creating it if needed.
    ///
    /// No namespace file is opened until it is first used.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the directory cannot be created.
    pub fn open(config: FileBackendConfig) -> StorageResult<Self> {
        let dir = config.path;
        std::fs::create_dir_all(&dir)
            .map_err(|source| FileStorageError::Directory { path: dir.clone(), source })?;
        tracing::info!(dir = %dir.display(), "file backend ready");

        Ok(Self {
            inner: Arc::new(Inner {
                dir,
                handles: RwLock::new(HashMap::new()),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Returns the number of namespace files currently open.
    #[must_use]
    pub fn open_namespaces(&self) -> usize {
        self.inner.handles.read().len()
    }

    /// Path of the file holding `namespace` (after normalization).
    #[must_use]
    pub fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.inner.namespace_path(namespace::normalize(namespace))
    }

    async fn run_blocking<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Inner) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let result = tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(FileStorageError::from)?;
        Ok(result?)
    }
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("dir", &self.inner.dir)
            .field("open_namespaces", &self.open_namespaces())
            .field("closed", &self.inner.closed.load(Ordering::Acquire))
            .finish()
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    let invalid = namespace == "."
        || namespace == ".."
        || namespace.contains(['/', '\\', '\0'])
        || namespace.contains("..");
    if invalid {
        return Err(FileStorageError::InvalidNamespace(namespace.to_owned()));
    }
    Ok(())
}

impl Inner {
    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.{NAMESPACE_FILE_EXTENSION}"))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FileStorageError::Closed);
        }
        Ok(())
    }

    /// Returns the handle for `namespace`, opening its file on first use.
    fn handle(&self, namespace: &str) -> Result<Arc<Database>> {
        self.ensure_open()?;
        if let Some(db) = self.handles.read().get(namespace) {
            return Ok(Arc::clone(db));
        }

        let mut handles = self.handles.write();
        // Another caller may have opened it between the two locks.
        if let Some(db) = handles.get(namespace) {
            return Ok(Arc::clone(db));
        }
        self.ensure_open()?;
        validate_namespace(namespace)?;

        let path = self.namespace_path(namespace);
        let db = Database::create(&path)
            .map_err(|source| FileStorageError::Open { path: path.clone(), source })?;
        tracing::debug!(namespace, path = %path.display(), "opened namespace file");

        let db = Arc::new(db);
        handles.insert(namespace.to_owned(), Arc::clone(&db));
        Ok(db)
    }

    fn get(&self, namespace: &str, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let db = self.handle(namespace)?;
        let txn = db.begin_read()?;
        let table = match txn.open_table(table(collection)?) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn exists(&self, namespace: &str, collection: &str, key: &str) -> Result<bool> {
        let db = self.handle(namespace)?;
        let txn = db.begin_read()?;
        let table = match txn.open_table(table(collection)?) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        Ok(table.get(key)?.is_some())
    }

    fn set(&self, namespace: &str, collection: &str, key: &str, value: &[u8]) -> Result<()> {
        let db = self.handle(namespace)?;
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(table(collection)?)?;
            table.insert(key, value)?;
        }
        // Dropping an uncommitted write transaction aborts it.
        fail_point!("file-backend-before-commit", |_| {
            Err(FileStorageError::Redb(redb::Error::Corrupted("injected commit failure".into())))
        });
        txn.commit()?;
        Ok(())
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// Opening a table inside a write transaction creates it; when the key is
    /// absent the transaction is aborted so a miss leaves the file untouched.
    fn delete(&self, namespace: &str, collection: &str, key: &str) -> Result<bool> {
        let db = self.handle(namespace)?;
        let txn = db.begin_write()?;
        let mut table = txn.open_table(table(collection)?)?;
        let removed = table.remove(key)?.is_some();
        drop(table);
        if !removed {
            txn.abort()?;
            return Ok(false);
        }
        txn.commit()?;
        Ok(true)
    }

    fn ping(&self) -> Result<()> {
        self.ensure_open()?;
        let meta = std::fs::metadata(&self.dir)
            .map_err(|source| FileStorageError::Directory { path: self.dir.clone(), source })?;
        if !meta.is_dir() {
            return Err(FileStorageError::Directory {
                path: self.dir.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            });
        }
        Ok(())
    }

    /// Marks the backend closed and releases every namespace handle.
    ///
    /// All handles are attempted; the first failure is returned.
    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        let handles: Vec<(String, Arc<Database>)> = self.handles.write().drain().collect();

        let mut first_error = None;
        for (namespace, db) in handles {
            match release_handle(&namespace, db) {
                Ok(()) => tracing::debug!(namespace, "closed namespace file"),
                Err(err) => {
                    tracing::warn!(namespace, error = %err, "failed to close namespace file");
                    first_error.get_or_insert(err);
                },
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn release_handle(namespace: &str, db: Arc<Database>) -> Result<()> {
    fail_point!("file-backend-release-handle", |_| {
        Err(FileStorageError::HandleInUse(namespace.to_owned()))
    });
    match Arc::try_unwrap(db) {
        Ok(db) => {
            drop(db);
            Ok(())
        },
        Err(_) => Err(FileStorageError::HandleInUse(namespace.to_owned())),
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    #[tracing::instrument(skip(self))]
    async fn get(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<Bytes> {
        let (ns, coll, k) = owned(namespace, collection, key);
        self.run_blocking(move |inner| inner.get(&ns, &coll, &k))
            .await?
            .map(Bytes::from)
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
        let (ns, coll, k) = owned(namespace, collection, key);
        self.run_blocking(move |inner| inner.set(&ns, &coll, &k, &value)).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<()> {
        let (ns, coll, k) = owned(namespace, collection, key);
        if self.run_blocking(move |inner| inner.delete(&ns, &coll, &k)).await? {
            Ok(())
        } else {
            Err(StorageError::not_found(key))
        }
    }

    #[tracing::instrument(skip(self))]
    async fn exists(&self, namespace: &str, collection: &str, key: &str) -> StorageResult<bool> {
        let (ns, coll, k) = owned(namespace, collection, key);
        self.run_blocking(move |inner| inner.exists(&ns, &coll, &k)).await
    }

    #[tracing::instrument(skip(self))]
    async fn ping(&self) -> StorageResult<()> {
        self.run_blocking(Inner::ping).await
    }

    #[tracing::instrument(skip(self))]
    async fn close(&self) -> StorageResult<()> {
        self.run_blocking(Inner::close).await
    }
}

fn owned(namespace: &str, collection: &str, key: &str) -> (String, String, String) {
    (namespace::normalize(namespace).to_owned(), collection.to_owned(), key.to_owned())
}
