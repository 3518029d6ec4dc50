//! Shared test utilities for storage backend testing.
//!
//! This module provides helpers for generating test data and asserting on
//! [`StorageResult`] values. It is feature-gated behind `testutil` to keep it
//! out of production builds.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! portcullis-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use portcullis_storage::testutil::{make_key, make_value, populated_backend};
//! ```

use crate::{
    StorageBackend,
    error::{StorageError, StorageResult},
    memory::MemoryBackend,
};

/// Create a deterministic test key from a prefix and index.
///
/// Produces keys like `"prefix:000042"` (zero-padded to 6 digits).
#[must_use]
pub fn make_key(prefix: &str, idx: usize) -> String {
    format!("{prefix}:{idx:06}")
}

/// Create a test value of the given size filled with `0xAB` bytes.
#[must_use]
pub fn make_value(size: usize) -> Vec<u8> {
    vec![0xAB; size]
}

/// Create a test value tagged with a task ID and sequence number.
///
/// Produces values like `"task3-val42"`; useful in concurrent tests to tell
/// which task wrote which value.
#[must_use]
pub fn make_tagged_value(task: usize, seq: usize) -> Vec<u8> {
    format!("task{task}-val{seq}").into_bytes()
}

/// Create a namespace name unique to this process and call site.
///
/// Remote backends keep data between runs; tests against them should write
/// into a fresh namespace each time.
#[must_use]
pub fn unique_namespace(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{prefix}-{}-{nanos}-{seq}", std::process::id())
}

/// Create a [`MemoryBackend`] with `count` keys in `namespace`/`collection`.
///
/// Keys are formatted by [`make_key`] with the collection as prefix; values
/// are `value_size` bytes each.
///
/// # Panics
///
/// Panics if any `set` operation fails (should not happen with `MemoryBackend`).
pub async fn populated_backend(
    namespace: &str,
    collection: &str,
    count: usize,
    value_size: usize,
) -> MemoryBackend {
    let backend = MemoryBackend::new();
    let value = make_value(value_size);
    for i in 0..count {
        backend
            .set(namespace, collection, &make_key(collection, i), value.clone())
            .await
            .expect("populate set failed");
    }
    backend
}

/// Assert that a [`StorageResult`] is a [`StorageError::NotFound`].
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use portcullis_storage::assert_not_found;
/// use portcullis_storage::error::{StorageError, StorageResult};
///
/// let result: StorageResult<()> = Err(StorageError::NotFound { key: "missing".into() });
/// assert_not_found!(result);
/// ```
#[macro_export]
macro_rules! assert_not_found {
    ($result:expr) => {{
        let result = $result;
        assert!(
            matches!(result, Err($crate::error::StorageError::NotFound { .. })),
            "expected StorageError::NotFound, got: {:?}",
            result,
        );
    }};
    ($result:expr, $msg:expr) => {{
        let result = $result;
        assert!(
            matches!(result, Err($crate::error::StorageError::NotFound { .. })),
            "{}: expected StorageError::NotFound, got: {:?}",
            $msg,
            result,
        );
    }};
}

/// Assert that a [`StorageResult`] is `Ok`.
///
/// Returns the inner value on success, panics with a descriptive message
/// on failure.
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use portcullis_storage::assert_storage_ok;
/// use portcullis_storage::error::StorageResult;
///
/// let result: StorageResult<i32> = Ok(42);
/// let value = assert_storage_ok!(result);
/// assert_eq!(value, 42);
/// ```
#[macro_export]
macro_rules! assert_storage_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got StorageError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got StorageError: {e:?}", $msg),
        }
    };
}

/// Assert that a [`StorageResult`] contains a [`StorageError::Timeout`].
#[macro_export]
macro_rules! assert_timeout {
    ($result:expr) => {{
        let result = $result;
        assert!(
            matches!(result, Err($crate::error::StorageError::Timeout)),
            "expected StorageError::Timeout, got: {:?}",
            result,
        );
    }};
}

/// Helper to verify that a result is a `NotFound` error.
pub fn is_not_found<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(StorageError::NotFound { .. }))
}

/// Helper to verify that a result is a `Connection` error.
pub fn is_connection<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(StorageError::Connection { .. }))
}
