//! Conformance test suite for [`StorageBackend`] implementations.
//!
//! Each function validates one clause of the storage contract. Every backend
//! (in-memory, embedded-file, remote-cache, document-store) runs the same
//! suite so they stay interchangeable.
//!
//! All functions take the namespace to write into. Backends that persist
//! data between test runs should pass a namespace unique to the run.
//!
//! # Usage
//!
//! ```no_run
//! use portcullis_storage::{MemoryBackend, conformance};
//!
//! #[tokio::test]
//! async fn crud_get_missing_key_is_not_found() {
//!     conformance::crud_get_missing_key_is_not_found(&MemoryBackend::new(), "ns").await;
//! }
//! ```
//!
//! # Test Categories
//!
//! | Category | Contract aspect |
//! |----------|-----------------|
//! | CRUD | get/set/delete/exists semantics, full replacement, binary values |
//! | Addressing | namespace defaulting, collection and namespace isolation, case sensitivity |
//! | Concurrent | thread-safety under parallel access |
//! | Lifecycle | ping on a healthy backend |

use std::sync::Arc;

use bytes::Bytes;

use crate::{
    assert_not_found, assert_storage_ok,
    backend::StorageBackend,
    namespace::DEFAULT_NAMESPACE,
    testutil::make_value,
};

// ============================================================================
// CRUD
// ============================================================================

/// `get` on a nonexistent key returns `NotFound`.
pub async fn crud_get_missing_key_is_not_found<B: StorageBackend>(backend: &B, ns: &str) {
    let result = backend.get(ns, "crud", "missing").await;
    assert_not_found!(result, "get of a missing key");
}

/// `get` in a collection that was never written returns `NotFound`.
pub async fn crud_get_missing_collection_is_not_found<B: StorageBackend>(backend: &B, ns: &str) {
    let result = backend.get(ns, "never-written", "k").await;
    assert_not_found!(result, "get in a missing collection");
}

/// `set` then `get` returns a byte-identical value.
pub async fn crud_set_then_get_returns_value<B: StorageBackend>(backend: &B, ns: &str) {
    assert_storage_ok!(backend.set(ns, "crud", "k1", b"v1".to_vec()).await, "set");
    let val = assert_storage_ok!(backend.get(ns, "crud", "k1").await, "get after set");
    assert_eq!(val, Bytes::from("v1"));
}

/// `set` on an existing key replaces the value entirely (no merge).
pub async fn crud_set_replaces_existing<B: StorageBackend>(backend: &B, ns: &str) {
    backend.set(ns, "crud", "k2", b"a much longer original".to_vec()).await.expect("set");
    backend.set(ns, "crud", "k2", b"short".to_vec()).await.expect("overwrite");
    let val = backend.get(ns, "crud", "k2").await.expect("get");
    assert_eq!(val, Bytes::from("short"));
}

/// `delete` removes a previously-set key.
pub async fn crud_delete_removes_key<B: StorageBackend>(backend: &B, ns: &str) {
    backend.set(ns, "crud", "k3", b"val".to_vec()).await.expect("set");
    backend.delete(ns, "crud", "k3").await.expect("delete");
    assert_not_found!(backend.get(ns, "crud", "k3").await, "get after delete");
}

/// Deleting an already-deleted key reports `NotFound` every time.
pub async fn crud_delete_twice_is_not_found<B: StorageBackend>(backend: &B, ns: &str) {
    backend.set(ns, "crud", "k4", b"v".to_vec()).await.expect("set");
    backend.delete(ns, "crud", "k4").await.expect("first delete");
    assert_not_found!(backend.delete(ns, "crud", "k4").await, "second delete");
    assert_not_found!(backend.delete(ns, "crud", "k4").await, "third delete");
}

/// `delete` in a collection that was never written reports `NotFound`.
pub async fn crud_delete_missing_collection_is_not_found<B: StorageBackend>(
    backend: &B,
    ns: &str,
) {
    assert_not_found!(backend.delete(ns, "never-created", "k").await, "delete in missing collection");
    let still_missing = backend.exists(ns, "never-created", "k").await.expect("exists");
    assert!(!still_missing);
}

/// `exists` tracks set and delete.
pub async fn crud_exists_tracks_lifecycle<B: StorageBackend>(backend: &B, ns: &str) {
    assert!(!backend.exists(ns, "crud", "k5").await.expect("exists before set"));
    backend.set(ns, "crud", "k5", b"v".to_vec()).await.expect("set");
    assert!(backend.exists(ns, "crud", "k5").await.expect("exists after set"));
    backend.delete(ns, "crud", "k5").await.expect("delete");
    assert!(!backend.exists(ns, "crud", "k5").await.expect("exists after delete"));
}

/// Empty values are stored and returned as empty, not as missing.
pub async fn crud_empty_value<B: StorageBackend>(backend: &B, ns: &str) {
    assert_storage_ok!(backend.set(ns, "crud", "empty", Vec::new()).await, "set empty value");
    let val = assert_storage_ok!(backend.get(ns, "crud", "empty").await, "get empty value");
    assert_eq!(val, Bytes::new());
}

/// Arbitrary (non-UTF-8) bytes round-trip unchanged.
pub async fn crud_binary_value_roundtrip<B: StorageBackend>(backend: &B, ns: &str) {
    let raw: Vec<u8> = vec![0x00, 0xFF, 0xFE, 0x80, 0x7F, 0x0A, 0xC3];
    backend.set(ns, "crud", "binary", raw.clone()).await.expect("set binary");
    let val = backend.get(ns, "crud", "binary").await.expect("get binary");
    assert_eq!(val, Bytes::from(raw));
}

/// Large values (1 MiB) round-trip correctly.
pub async fn crud_large_value_roundtrip<B: StorageBackend>(backend: &B, ns: &str) {
    let big = make_value(1_048_576);
    backend.set(ns, "crud", "big", big.clone()).await.expect("set large value");
    let val = backend.get(ns, "crud", "big").await.expect("get large value");
    assert_eq!(val.len(), big.len(), "large value length mismatch");
    assert_eq!(val, Bytes::from(big));
}

// ============================================================================
// Addressing
// ============================================================================

/// An empty namespace addresses the default partition.
///
/// This test always writes into [`DEFAULT_NAMESPACE`]; the key is suffixed
/// with `ns` to keep repeated runs apart.
pub async fn addr_empty_namespace_is_default<B: StorageBackend>(backend: &B, ns: &str) {
    let key = format!("default-probe-{ns}");
    backend.set("", "addr", &key, b"via-empty".to_vec()).await.expect("set via empty namespace");
    let val = backend.get(DEFAULT_NAMESPACE, "addr", &key).await.expect("get via default");
    assert_eq!(val, Bytes::from("via-empty"));
    backend.delete(DEFAULT_NAMESPACE, "addr", &key).await.expect("cleanup");
}

/// The same key in different collections holds independent values.
pub async fn addr_collections_are_isolated<B: StorageBackend>(backend: &B, ns: &str) {
    backend.set(ns, "cards", "shared", b"card".to_vec()).await.expect("set card");
    backend.set(ns, "devices", "shared", b"device".to_vec()).await.expect("set device");
    assert_eq!(backend.get(ns, "cards", "shared").await.expect("get"), Bytes::from("card"));
    assert_eq!(backend.get(ns, "devices", "shared").await.expect("get"), Bytes::from("device"));
}

/// The same key in different namespaces holds independent values.
pub async fn addr_namespaces_are_isolated<B: StorageBackend>(backend: &B, ns: &str) {
    let other = format!("{ns}-other");
    backend.set(ns, "iso", "k", b"mine".to_vec()).await.expect("set");
    assert!(!backend.exists(&other, "iso", "k").await.expect("exists in other namespace"));
    backend.set(&other, "iso", "k", b"theirs".to_vec()).await.expect("set other");
    assert_eq!(backend.get(ns, "iso", "k").await.expect("get"), Bytes::from("mine"));
}

/// Keys are case-sensitive.
pub async fn addr_keys_are_case_sensitive<B: StorageBackend>(backend: &B, ns: &str) {
    backend.set(ns, "case", "Card-A", b"upper".to_vec()).await.expect("set upper");
    backend.set(ns, "case", "card-a", b"lower".to_vec()).await.expect("set lower");
    assert_eq!(backend.get(ns, "case", "Card-A").await.expect("get"), Bytes::from("upper"));
    assert_eq!(backend.get(ns, "case", "card-a").await.expect("get"), Bytes::from("lower"));
}

// ============================================================================
// Concurrent
// ============================================================================

/// Concurrent sets to different keys all succeed.
///
/// Requires `B: 'static` so the backend can be shared across spawned tasks
/// via `Arc`.
pub async fn concurrent_sets_to_different_keys<B: StorageBackend + 'static>(
    backend: Arc<B>,
    ns: &str,
) {
    let mut handles = Vec::new();
    for i in 0u32..50 {
        let backend = Arc::clone(&backend);
        let ns = ns.to_owned();
        handles.push(tokio::spawn(async move {
            let key = format!("conc:{i:04}");
            backend.set(&ns, "conc", &key, format!("val:{i}").into_bytes()).await
        }));
    }
    for handle in handles {
        handle.await.expect("task join").expect("concurrent set");
    }

    for i in 0u32..50 {
        let key = format!("conc:{i:04}");
        let val = backend.get(ns, "conc", &key).await.expect("get after concurrent sets");
        assert_eq!(val, Bytes::from(format!("val:{i}")));
    }
}

/// Concurrent first access to fresh namespaces succeeds for every caller.
pub async fn concurrent_first_access_to_namespace<B: StorageBackend + 'static>(
    backend: Arc<B>,
    ns: &str,
) {
    let mut handles = Vec::new();
    for i in 0u32..32 {
        let backend = Arc::clone(&backend);
        // Four tasks race on each of eight fresh namespaces.
        let fresh = format!("{ns}-fresh-{}", i % 8);
        handles.push(tokio::spawn(async move {
            backend.set(&fresh, "race", &format!("k{i}"), b"v".to_vec()).await
        }));
    }
    for handle in handles {
        handle.await.expect("task join").expect("set during first access");
    }

    for i in 0u32..32 {
        let fresh = format!("{ns}-fresh-{}", i % 8);
        assert!(backend.exists(&fresh, "race", &format!("k{i}")).await.expect("exists"));
    }
}

/// Concurrent reads of the same key all return the same value.
pub async fn concurrent_reads_return_consistent_value<B: StorageBackend + 'static>(
    backend: Arc<B>,
    ns: &str,
) {
    backend.set(ns, "cread", "k", b"stable".to_vec()).await.expect("set");

    let mut handles = Vec::new();
    for _ in 0..50 {
        let backend = Arc::clone(&backend);
        let ns = ns.to_owned();
        handles.push(tokio::spawn(async move { backend.get(&ns, "cread", "k").await }));
    }

    for handle in handles {
        let val = handle.await.expect("task join").expect("concurrent get");
        assert_eq!(val, Bytes::from("stable"));
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// `ping` succeeds on a healthy backend.
pub async fn ping_succeeds<B: StorageBackend>(backend: &B) {
    backend.ping().await.expect("ping on a healthy backend");
}

// ============================================================================
// Convenience runner
// ============================================================================

/// Run the full conformance suite against the given backend.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use portcullis_storage::{MemoryBackend, conformance};
///
/// #[tokio::test]
/// async fn memory_backend_conformance() {
///     conformance::run_all(Arc::new(MemoryBackend::new()), "suite").await;
/// }
/// ```
pub async fn run_all<B: StorageBackend + 'static>(backend: Arc<B>, ns: &str) {
    // CRUD
    crud_get_missing_key_is_not_found(backend.as_ref(), ns).await;
    crud_get_missing_collection_is_not_found(backend.as_ref(), ns).await;
    crud_set_then_get_returns_value(backend.as_ref(), ns).await;
    crud_set_replaces_existing(backend.as_ref(), ns).await;
    crud_delete_removes_key(backend.as_ref(), ns).await;
    crud_delete_twice_is_not_found(backend.as_ref(), ns).await;
    crud_delete_missing_collection_is_not_found(backend.as_ref(), ns).await;
    crud_exists_tracks_lifecycle(backend.as_ref(), ns).await;
    crud_empty_value(backend.as_ref(), ns).await;
    crud_binary_value_roundtrip(backend.as_ref(), ns).await;
    crud_large_value_roundtrip(backend.as_ref(), ns).await;

    // Addressing
    addr_empty_namespace_is_default(backend.as_ref(), ns).await;
    addr_collections_are_isolated(backend.as_ref(), ns).await;
    addr_namespaces_are_isolated(backend.as_ref(), ns).await;
    addr_keys_are_case_sensitive(backend.as_ref(), ns).await;

    // Concurrent
    concurrent_sets_to_different_keys(Arc::clone(&backend), ns).await;
    concurrent_first_access_to_namespace(Arc::clone(&backend), ns).await;
    concurrent_reads_return_consistent_value(Arc::clone(&backend), ns).await;

    // Lifecycle
    ping_succeeds(backend.as_ref()).await;
}
