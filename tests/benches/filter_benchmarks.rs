//! # Shard-Bloom Benchmarks
//!
//! End-to-end add / exists cost against the in-memory store, so the numbers
//! isolate hashing, location resolution and batching from network latency.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shard_bloom::{InMemoryBitmapStore, MembershipFilter, ShardedBloomFilter};
use tokio::runtime::Runtime;

fn random_values(count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| (0..32).map(|_| rng.gen::<u8>()).collect())
        .collect()
}

fn setup(rt: &Runtime, capacity: u64) -> ShardedBloomFilter<InMemoryBitmapStore> {
    rt.block_on(async {
        let store = Arc::new(InMemoryBitmapStore::with_shard_capacity(capacity));
        ShardedBloomFilter::create(store, "bench", 100_000, 0.001)
            .await
            .expect("create")
    })
}

fn bench_single_ops(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("single");

    // One shard vs. the bit array split across many keys
    for capacity in [1u64 << 32, 1 << 16] {
        let filter = setup(&rt, capacity);
        let shards = filter.shards().len();
        let values = random_values(1_000);
        let mut i = 0;

        group.bench_with_input(BenchmarkId::new("add", shards), &shards, |b, _| {
            b.to_async(&rt).iter(|| {
                i = (i + 1) % values.len();
                let value = &values[i];
                let filter = &filter;
                async move { filter.add(black_box(value)).await.expect("add") }
            })
        });

        group.bench_with_input(BenchmarkId::new("exists", shards), &shards, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(filter.exists(b"probe").await.expect("exists")) })
        });
    }

    group.finish();
}

fn bench_batched(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let filter = setup(&rt, 1 << 32);
    let mut group = c.benchmark_group("batched");

    for size in [10usize, 100, 1_000] {
        let values = random_values(size);
        let slices: Vec<&[u8]> = values.iter().map(Vec::as_slice).collect();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("add_many", size), &slices, |b, slices| {
            b.to_async(&rt)
                .iter(|| async { filter.add_many(black_box(slices)).await.expect("add_many") })
        });
        group.bench_with_input(BenchmarkId::new("exists_many", size), &slices, |b, slices| {
            b.to_async(&rt).iter(|| async {
                black_box(filter.exists_many(slices).await.expect("exists_many"))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_ops, bench_batched);
criterion_main!(benches);
