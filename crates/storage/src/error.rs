//! Storage error types and result alias.
//!
//! Every backend maps its native failures onto [`StorageError`] so callers can
//! ask "was this a missing key?" or "is the backend unreachable?" without
//! knowing which backend is configured. The native error is preserved as the
//! `#[source]` of the mapped variant for server-side logging; it must never be
//! echoed to API callers.
//!
//! # Error Types
//!
//! - [`StorageError::NotFound`] - Key (or its collection) does not exist
//! - [`StorageError::Connection`] - Backend unreachable, closed, or failed to open
//! - [`StorageError::Serialization`] - Stored data could not be decoded
//! - [`StorageError::InvalidArgument`] - Identifier rejected before reaching the backend
//! - [`StorageError::Internal`] - Backend-specific internal errors
//! - [`StorageError::Timeout`] - The caller's deadline passed first
//! - [`StorageError::Cancelled`] - The caller cancelled the operation
//!
//! # Example
//!
//! ```
//! use portcullis_storage::{StorageError, StorageResult};
//!
//! fn lookup(key: &str) -> StorageResult<Vec<u8>> {
//!     Err(StorageError::not_found(key))
//! }
//!
//! assert!(lookup("missing").unwrap_err().is_not_found());
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A shareable boxed error for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// This enum is the canonical set of errors any backend can produce. It is
/// `#[non_exhaustive]`: downstream matches need a wildcard arm.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The requested key was not found.
    ///
    /// This is an expected condition, not a failure. Backends also report it
    /// when the enclosing collection does not exist.
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found.
        key: String,
    },

    /// Connection or network error.
    ///
    /// Raised when the backend cannot be reached at construction or ping
    /// time, when a namespace file cannot be opened, or after the backend was
    /// closed. Fatal at startup, retryable per request.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Serialization or deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
        /// The underlying error that caused serialization to fail.
        #[source]
        source: Option<BoxError>,
    },

    /// An identifier was rejected before any backend call was made.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was rejected.
        message: String,
    },

    /// Internal storage backend error.
    ///
    /// Catch-all for backend-specific errors that don't fit other categories.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },

    /// The caller's deadline elapsed before the operation completed.
    #[error("Operation timeout")]
    Timeout,

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

impl StorageError {
    /// Creates a new `NotFound` error for the given key.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Serialization` error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), source: None }
    }

    /// Creates a new `Serialization` error with a message and source error.
    #[must_use]
    pub fn serialization_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Creates a new `Cancelled` error.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    /// Returns `true` if the key (or its collection) does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the backend could not be reached.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns `true` if a caller-side retry may succeed.
    ///
    /// Connection failures and timeouts are transient. Missing keys, decode
    /// failures, rejected arguments and cancellations are not. The core never
    /// retries on its own; this is a hint for the caller's retry policy.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout)
    }
}
