//! Errors raised by the access layer.
//!
//! Negative access decisions are not errors; they are
//! [`VerificationOutcome`](crate::VerificationOutcome) values. An
//! [`AccessError`] means the decision could not be made at all.

use portcullis_storage::StorageError;
use thiserror::Error;

/// Result type alias for access operations.
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Failures that prevent an access decision.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccessError {
    /// The presented card input normalizes to an empty card number.
    #[error("card number is empty")]
    InvalidCardNumber,

    /// A stored card or device record could not be decoded.
    #[error("malformed {collection} record {key:?}: {source}")]
    Decode {
        /// Collection holding the record.
        collection: &'static str,
        /// Record key.
        key: String,
        /// JSON decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded for storage.
    #[error("failed to encode {collection} record {key:?}: {source}")]
    Encode {
        /// Target collection.
        collection: &'static str,
        /// Record key.
        key: String,
        /// JSON encoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AccessError {
    /// Returns `true` for errors caused by the caller's input rather than the
    /// system.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidCardNumber)
    }

    /// Returns `true` if retrying the call may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_transient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(AccessError::InvalidCardNumber.is_validation());
        assert!(!AccessError::from(StorageError::timeout()).is_validation());
    }

    #[test]
    fn test_storage_errors_keep_transience() {
        assert!(AccessError::from(StorageError::connection("down")).is_transient());
        assert!(!AccessError::from(StorageError::not_found("k")).is_transient());
        assert!(!AccessError::InvalidCardNumber.is_transient());
    }

    #[test]
    fn test_storage_error_display_is_transparent() {
        let err = AccessError::from(StorageError::timeout());
        assert_eq!(err.to_string(), StorageError::timeout().to_string());
    }
}
