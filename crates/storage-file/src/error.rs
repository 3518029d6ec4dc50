//! Error types for the file storage backend.
//!
//! redb reports failures through several distinct error types (one per
//! operation stage). They are funnelled into [`FileStorageError`] here and
//! then mapped onto the canonical [`StorageError`] taxonomy at the trait
//! boundary.

use std::path::PathBuf;

use portcullis_storage::StorageError;
use thiserror::Error;

/// Result type alias for file backend internals.
pub type Result<T> = std::result::Result<T, FileStorageError>;

/// Errors specific to the file storage backend.
#[derive(Debug, Error)]
pub enum FileStorageError {
    /// The storage directory could not be created or inspected.
    #[error("storage directory {path}: {source}")]
    Directory {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A namespace file could not be opened.
    #[error("failed to open namespace file {path}: {source}")]
    Open {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying redb error.
        #[source]
        source: redb::DatabaseError,
    },

    /// The namespace cannot be used as a file name.
    #[error("invalid namespace {0:?}: must be a plain file name")]
    InvalidNamespace(String),

    /// The collection name cannot be used as a table name.
    #[error("collection name must not be empty")]
    InvalidCollection,

    /// Error raised by redb inside a transaction.
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    /// The backend has been closed.
    #[error("file backend is closed")]
    Closed,

    /// A namespace handle could not be released during close.
    #[error("namespace {0:?} still has operations in flight")]
    HandleInUse(String),

    /// The blocking worker running the operation panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

macro_rules! from_redb {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for FileStorageError {
                fn from(err: $ty) -> Self {
                    Self::Redb(err.into())
                }
            }
        )+
    };
}

from_redb!(redb::TransactionError, redb::TableError, redb::StorageError, redb::CommitError);

impl From<FileStorageError> for StorageError {
    fn from(err: FileStorageError) -> Self {
        match err {
            FileStorageError::Directory { .. } | FileStorageError::Open { .. } => {
                let message = err.to_string();
                StorageError::connection_with_source(message, err)
            },
            FileStorageError::InvalidNamespace(_) | FileStorageError::InvalidCollection => {
                StorageError::invalid_argument(err.to_string())
            },
            FileStorageError::Closed => StorageError::connection(err.to_string()),
            FileStorageError::Redb(redb::Error::DatabaseAlreadyOpen) => {
                StorageError::connection(err.to_string())
            },
            FileStorageError::Redb(_) | FileStorageError::Join(_) => {
                let message = err.to_string();
                StorageError::internal_with_source(message, err)
            },
            FileStorageError::HandleInUse(_) => StorageError::internal(err.to_string()),
        }
    }
}
