//! Error types for the document storage backend.

use mongodb::error::{Error as MongoError, ErrorKind};
use portcullis_storage::StorageError;
use thiserror::Error;

/// Result type alias for document backend internals.
pub type Result<T> = std::result::Result<T, DocumentStorageError>;

/// Server error codes meaning the `key` index already exists in some form.
///
/// - 68: `IndexAlreadyExists`
/// - 85: `IndexOptionsConflict`
/// - 86: `IndexKeySpecsConflict`
pub const INDEX_EXISTS_CODES: [i32; 3] = [68, 85, 86];

/// Errors specific to the document storage backend.
#[derive(Debug, Error)]
pub enum DocumentStorageError {
    /// Error reported by the MongoDB driver.
    #[error("mongodb error: {0}")]
    Mongo(#[from] MongoError),

    /// A stored document lacks a usable `value` field.
    #[error("document for key {key:?} has no readable value: {reason}")]
    MalformedDocument {
        /// Key of the offending document.
        key: String,
        /// What was wrong.
        reason: String,
    },

    /// The initial connection did not complete within the connect timeout.
    #[error("timed out connecting to document store after {0:?}")]
    ConnectTimeout(std::time::Duration),
}

/// Returns `true` for index-creation errors that mean "already indexed".
#[must_use]
pub fn is_index_exists(err: &MongoError) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(cmd) if INDEX_EXISTS_CODES.contains(&cmd.code))
}

impl From<DocumentStorageError> for StorageError {
    fn from(err: DocumentStorageError) -> Self {
        match err {
            DocumentStorageError::Mongo(source) => mongo_error_to_storage_error(source),
            DocumentStorageError::MalformedDocument { .. } => {
                StorageError::serialization(err.to_string())
            },
            DocumentStorageError::ConnectTimeout(_) => StorageError::connection(err.to_string()),
        }
    }
}

fn mongo_error_to_storage_error(err: MongoError) -> StorageError {
    let message = err.to_string();
    match err.kind.as_ref() {
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Authentication { .. } => StorageError::connection_with_source(message, err),
        ErrorKind::InvalidArgument { .. } => StorageError::invalid_argument(message),
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            StorageError::serialization_with_source(message, err)
        },
        _ => StorageError::internal_with_source(message, err),
    }
}
