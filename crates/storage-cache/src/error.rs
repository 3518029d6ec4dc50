//! Error types for the cache storage backend.

use portcullis_storage::StorageError;
use redis::{ErrorKind, RedisError};
use thiserror::Error;

/// Result type alias for cache backend internals.
pub type Result<T> = std::result::Result<T, CacheStorageError>;

/// Errors specific to the cache storage backend.
#[derive(Debug, Error)]
pub enum CacheStorageError {
    /// The connection URI could not be parsed.
    #[error("invalid cache URI {uri:?}: {reason}")]
    InvalidUri {
        /// URI as given, with any password masked.
        uri: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The initial connection did not complete within the connect timeout.
    #[error("timed out connecting to cache server after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// Error reported by the redis client.
    #[error("redis error: {0}")]
    Redis(#[from] RedisError),
}

impl From<CacheStorageError> for StorageError {
    fn from(err: CacheStorageError) -> Self {
        match err {
            CacheStorageError::InvalidUri { .. } => StorageError::invalid_argument(err.to_string()),
            CacheStorageError::ConnectTimeout(_) => StorageError::connection(err.to_string()),
            CacheStorageError::Redis(source) => redis_error_to_storage_error(source),
        }
    }
}

/// Maps a redis client error onto the canonical storage taxonomy.
///
/// Transport-level failures become `Connection` so callers can treat them as
/// transient; everything the server rejected is `Internal`.
fn redis_error_to_storage_error(err: RedisError) -> StorageError {
    let message = err.to_string();
    if err.is_timeout() {
        return StorageError::timeout();
    }
    if err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_cluster_error()
    {
        return StorageError::connection_with_source(message, err);
    }
    match err.kind() {
        ErrorKind::AuthenticationFailed | ErrorKind::BusyLoadingError | ErrorKind::TryAgain => {
            StorageError::connection_with_source(message, err)
        },
        ErrorKind::TypeError => StorageError::serialization_with_source(message, err),
        ErrorKind::InvalidClientConfig => StorageError::invalid_argument(message),
        _ => StorageError::internal_with_source(message, err),
    }
}
