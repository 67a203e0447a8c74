//! Criterion benchmarks for core t-digest operations.
//!
//! Discover benches:
//!   cargo bench --bench tdigest_core -- --list
//!
//! Save a baseline and compare later:
//!   cargo bench --bench tdigest_core -- --save-baseline core_base
//!   cargo bench --bench tdigest_core -- --baseline core_base "add/stream"

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tdigest_testdata::{gen_dataset, split_shards, DistKind};
use tdigest_tree::TDigest;

/* ------------------------ BUILD HELPERS ------------------------ */

fn build_digest(kind: DistKind, n: usize, compression: f64, seed: u64) -> TDigest {
    let mut td = TDigest::with_seed(compression, seed);
    for v in gen_dataset(kind, n, seed) {
        td.add(v, 1).expect("finite data");
    }
    td
}

/* ------------------------ BENCH: ADD ------------------------ */

fn bench_add(c: &mut Criterion) {
    let n = 20_000;
    let data = gen_dataset(DistKind::Mixture, n, 42);

    let mut g = c.benchmark_group("add/stream");
    g.throughput(Throughput::Elements(n as u64));
    for compression in [1.0, 10.0, 100.0] {
        g.bench_with_input(
            BenchmarkId::from_parameter(format!("compression={compression}")),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut td = TDigest::with_seed(compression, 7);
                    for &v in data {
                        td.add(black_box(v), 1).expect("finite data");
                    }
                    black_box(td.len())
                });
            },
        );
    }
    g.finish();

    // Ascending input is the worst case for centroid growth.
    let mut g = c.benchmark_group("add/sequential");
    g.throughput(Throughput::Elements(n as u64));
    g.bench_function("compression=10", |b| {
        b.iter(|| black_box(build_digest(DistKind::Sequential, n, 10.0, 1).len()));
    });
    g.finish();
}

/* ------------------------ BENCH: COMPRESS ------------------------ */

fn bench_compress(c: &mut Criterion) {
    let td = build_digest(DistKind::Uniform, 50_000, 100.0, 3);

    let mut g = c.benchmark_group("compress");
    g.bench_function(BenchmarkId::from_parameter(td.len()), |b| {
        b.iter_batched(
            || td.clone(),
            |mut td| {
                td.compress();
                black_box(td.len())
            },
            criterion::BatchSize::SmallInput,
        );
    });
    g.finish();
}

/* ------------------------ BENCH: MERGE ------------------------ */

fn bench_merge(c: &mut Criterion) {
    let data = gen_dataset(DistKind::Uniform, 50_000, 11);
    let parts: Vec<TDigest> = split_shards(&data, 8, 12)
        .into_iter()
        .enumerate()
        .map(|(i, shard)| {
            let mut td = TDigest::with_seed(100.0, i as u64);
            td.add_many(shard).expect("finite data");
            td
        })
        .collect();

    let mut g = c.benchmark_group("merge");
    g.bench_function("shards=8", |b| {
        b.iter(|| {
            let mut acc = TDigest::with_seed(100.0, 0);
            acc.merge_many(black_box(&parts));
            black_box(acc.total_weight())
        });
    });
    g.finish();
}

/* --------------------- BENCH: PERCENTILE ------------------------ */

fn bench_percentile(c: &mut Criterion) {
    let td = build_digest(DistKind::Mixture, 200_000, 100.0, 123);

    let mut g_single = c.benchmark_group("percentile/single");
    for p in [0.01, 0.5, 0.99] {
        g_single.bench_with_input(BenchmarkId::from_parameter(p), &p, |b, &p| {
            b.iter(|| black_box(td.percentile(black_box(p))));
        });
    }
    g_single.finish();

    let ps: Vec<f64> = (1..1000).map(|i| (i as f64) / 1000.0).collect();
    let mut g_batch = c.benchmark_group("percentile/batch_1000");
    g_batch.throughput(Throughput::Elements(ps.len() as u64));
    g_batch.bench_function("grid", |b| {
        b.iter(|| black_box(td.percentiles(black_box(&ps))));
    });
    g_batch.finish();
}

/* ------------------------ CONFIG (hard-coded timing) ------------------------ */

fn configure() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(2))
        .sample_size(20)
        .without_plots()
}

/* ------------------------ GROUP REGISTRATION ------------------------ */

criterion_group!(
    name = tdigest_benches;
    config = configure();
    targets =
        bench_add,
        bench_compress,
        bench_merge,
        bench_percentile
);

criterion_main!(tdigest_benches);
