//! Integration test verifying that `#[instrument]` annotations produce
//! the expected spans on `MemoryBackend` operations.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use portcullis_storage::{MemoryBackend, StorageBackend};
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

// ---------------------------------------------------------------------------
// Collecting layer — records span names as they are created
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct SpanCollector {
    spans: Arc<Mutex<Vec<String>>>,
}

impl<S> tracing_subscriber::Layer<S> for SpanCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        _attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            self.spans.lock().expect("lock poisoned").push(span.name().to_owned());
        }
    }
}

fn recorded(spans: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    spans.lock().expect("lock poisoned").clone()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn memory_backend_set_creates_span() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(collector));

    let backend = MemoryBackend::new();
    backend.set("ns", "cards", "key-1", b"value-1".to_vec()).await.expect("set should succeed");

    let recorded = recorded(&spans);
    assert!(recorded.iter().any(|s| s == "set"), "expected a 'set' span, got: {recorded:?}");
}

#[tokio::test]
async fn memory_backend_get_creates_span() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(collector));

    let backend = MemoryBackend::new();
    let _ = backend.get("ns", "cards", "missing").await;

    let recorded = recorded(&spans);
    assert!(recorded.iter().any(|s| s == "get"), "expected a 'get' span, got: {recorded:?}");
}

#[tokio::test]
async fn memory_backend_delete_and_exists_create_spans() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(collector));

    let backend = MemoryBackend::new();
    let _ = backend.delete("ns", "cards", "key").await;
    let _ = backend.exists("ns", "cards", "key").await;

    let recorded = recorded(&spans);
    assert!(recorded.iter().any(|s| s == "delete"), "expected a 'delete' span, got: {recorded:?}");
    assert!(recorded.iter().any(|s| s == "exists"), "expected an 'exists' span, got: {recorded:?}");
}

#[tokio::test]
async fn memory_backend_ping_creates_span() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);
    let _guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(collector));

    let backend = MemoryBackend::new();
    backend.ping().await.expect("ping");

    let recorded = recorded(&spans);
    assert!(recorded.iter().any(|s| s == "ping"), "expected a 'ping' span, got: {recorded:?}");
}
