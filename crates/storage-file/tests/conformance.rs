//! Conformance test suite for `FileBackend`.
//!
//! Every test gets its own temporary directory, so namespace files never
//! leak between tests.

#![allow(clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use portcullis_storage::conformance;
use portcullis_storage_file::{FileBackend, FileBackendConfig};
use tempfile::TempDir;

const NS: &str = "conformance";

fn backend() -> (TempDir, FileBackend) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let backend = FileBackend::open(FileBackendConfig::new(dir.path())).expect("open backend");
    (dir, backend)
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn crud_get_missing_key_is_not_found() {
    let (_dir, backend) = backend();
    conformance::crud_get_missing_key_is_not_found(&backend, NS).await;
}

#[tokio::test]
async fn crud_get_missing_collection_is_not_found() {
    let (_dir, backend) = backend();
    conformance::crud_get_missing_collection_is_not_found(&backend, NS).await;
}

#[tokio::test]
async fn crud_set_then_get_returns_value() {
    let (_dir, backend) = backend();
    conformance::crud_set_then_get_returns_value(&backend, NS).await;
}

#[tokio::test]
async fn crud_set_replaces_existing() {
    let (_dir, backend) = backend();
    conformance::crud_set_replaces_existing(&backend, NS).await;
}

#[tokio::test]
async fn crud_delete_removes_key() {
    let (_dir, backend) = backend();
    conformance::crud_delete_removes_key(&backend, NS).await;
}

#[tokio::test]
async fn crud_delete_twice_is_not_found() {
    let (_dir, backend) = backend();
    conformance::crud_delete_twice_is_not_found(&backend, NS).await;
}

#[tokio::test]
async fn crud_delete_missing_collection_is_not_found() {
    let (_dir, backend) = backend();
    conformance::crud_delete_missing_collection_is_not_found(&backend, NS).await;
}

#[tokio::test]
async fn crud_exists_tracks_lifecycle() {
    let (_dir, backend) = backend();
    conformance::crud_exists_tracks_lifecycle(&backend, NS).await;
}

#[tokio::test]
async fn crud_empty_value() {
    let (_dir, backend) = backend();
    conformance::crud_empty_value(&backend, NS).await;
}

#[tokio::test]
async fn crud_binary_value_roundtrip() {
    let (_dir, backend) = backend();
    conformance::crud_binary_value_roundtrip(&backend, NS).await;
}

#[tokio::test]
async fn crud_large_value_roundtrip() {
    let (_dir, backend) = backend();
    conformance::crud_large_value_roundtrip(&backend, NS).await;
}

// ============================================================================
// Addressing
// ============================================================================

#[tokio::test]
async fn addr_empty_namespace_is_default() {
    let (_dir, backend) = backend();
    conformance::addr_empty_namespace_is_default(&backend, NS).await;
}

#[tokio::test]
async fn addr_collections_are_isolated() {
    let (_dir, backend) = backend();
    conformance::addr_collections_are_isolated(&backend, NS).await;
}

#[tokio::test]
async fn addr_namespaces_are_isolated() {
    let (_dir, backend) = backend();
    conformance::addr_namespaces_are_isolated(&backend, NS).await;
}

#[tokio::test]
async fn addr_keys_are_case_sensitive() {
    let (_dir, backend) = backend();
    conformance::addr_keys_are_case_sensitive(&backend, NS).await;
}

// ============================================================================
// Concurrent
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sets_to_different_keys() {
    let (_dir, backend) = backend();
    conformance::concurrent_sets_to_different_keys(Arc::new(backend), NS).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_access_to_namespace() {
    let (_dir, backend) = backend();
    conformance::concurrent_first_access_to_namespace(Arc::new(backend), NS).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_return_consistent_value() {
    let (_dir, backend) = backend();
    conformance::concurrent_reads_return_consistent_value(Arc::new(backend), NS).await;
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn ping_succeeds() {
    let (_dir, backend) = backend();
    conformance::ping_succeeds(&backend).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn run_all() {
    let (_dir, backend) = backend();
    conformance::run_all(Arc::new(backend), NS).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_access_opens_each_file_once() {
    let (_dir, backend) = backend();
    let backend = Arc::new(backend);
    conformance::concurrent_first_access_to_namespace(Arc::clone(&backend), "fresh").await;
    assert_eq!(backend.open_namespaces(), 8);
}
