#![allow(clippy::expect_used)]

use chrono::{TimeDelta, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use portcullis_access::{
    Card, CardNumber, CardRepository, Device, DeviceRepository, StoreRepository,
    VerificationRequest, Verifier,
};
use portcullis_storage::{CallContext, MemoryBackend};
use tokio::runtime::Runtime;

fn rt() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime")
}

fn card_number_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("card_number");

    let text = b"  abc-1234567890\r\n".to_vec();
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("text", |b| b.iter(|| CardNumber::derive(std::hint::black_box(&text))));

    for len in [4usize, 8, 16] {
        let raw: Vec<u8> = (0..len).map(|i| (i * 37) as u8 | 0x80).collect();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("reversed_hex", len), &raw, |b, raw| {
            b.iter(|| CardNumber::derive(std::hint::black_box(raw)));
        });
    }

    group.finish();
}

fn verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    let rt = rt();
    let now = Utc::now();

    let repo = StoreRepository::new(MemoryBackend::new());
    rt.block_on(async {
        let ctx = CallContext::new();
        repo.put_device(&ctx, &Device::builder().id("SN-001").namespace("bench").build())
            .await
            .expect("put device");
        repo.put_card(
            &ctx,
            &Card::builder()
                .number("12345")
                .namespace("bench")
                .devices((0..64).map(|i| format!("SN-{i:03}")).collect())
                .effective_at(now - TimeDelta::hours(1))
                .invalid_at(now + TimeDelta::hours(1))
                .build(),
        )
        .await
        .expect("put card");
    });
    let verifier = Verifier::new(repo);

    for (name, raw) in [("authorized", &b"12345"[..]), ("card_unknown", &b"99999"[..])] {
        let request = VerificationRequest::builder()
            .namespace("bench")
            .device_id("SN-001")
            .raw(raw.to_vec())
            .build();
        group.bench_function(name, |b| {
            b.to_async(&rt).iter(|| async {
                verifier.verify_at(&CallContext::new(), &request, now).await.expect("verify");
            });
        });
    }

    group.finish();
}

criterion_group!(benches, card_number_derivation, verify);
criterion_main!(benches);
