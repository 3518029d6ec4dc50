#![cfg(feature = "failpoints")]
#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection in `MemoryBackend`.
//!
//! These tests require the `failpoints` feature:
//! ```bash
//! cargo test -p portcullis-storage --features failpoints --test failpoint_tests
//! ```

use portcullis_storage::{MemoryBackend, StorageBackend, testutil::is_connection};

#[tokio::test]
async fn get_failpoint_returns_connection_error() {
    let scenario = fail::FailScenario::setup();
    let backend = MemoryBackend::new();
    backend.set("acme", "cards", "k", b"v".to_vec()).await.expect("set");

    fail::cfg("memory-backend-get", "return").expect("failed to configure fail point");
    let result = backend.get("acme", "cards", "k").await;
    assert!(is_connection(&result), "got {result:?}");
    assert!(result.expect_err("injected").is_transient());

    scenario.teardown();
}

#[tokio::test]
async fn set_failpoint_leaves_store_unchanged() {
    let scenario = fail::FailScenario::setup();
    let backend = MemoryBackend::new();

    fail::cfg("memory-backend-set", "return").expect("failed to configure fail point");
    let result = backend.set("acme", "cards", "k", b"v".to_vec()).await;
    assert!(is_connection(&result), "got {result:?}");
    fail::remove("memory-backend-set");

    assert!(backend.is_empty());

    scenario.teardown();
}

#[tokio::test]
async fn failpoint_without_config_succeeds() {
    let scenario = fail::FailScenario::setup();
    let backend = MemoryBackend::new();

    backend.set("acme", "cards", "k", b"v".to_vec()).await.expect("set");
    backend.get("acme", "cards", "k").await.expect("get");

    scenario.teardown();
}
