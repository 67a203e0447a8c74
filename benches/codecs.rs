// benches/codecs.rs
use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion, SamplingMode, Throughput};
use tdigest_testdata::{gen_weighted, DistKind};
use tdigest_tree::TDigest;

const DIGESTS: usize = 100; // digests encoded/decoded per iteration
const SAMPLES: usize = 5_000; // weighted samples per digest
const COMPRESSION: f64 = 100.0;

fn synth_digest(seed: u64) -> TDigest {
    let mut td = TDigest::with_seed(COMPRESSION, seed);
    for (v, c) in gen_weighted(DistKind::Exponential { scale: 10.0 }, SAMPLES, 50, seed) {
        td.add(v, c).expect("finite data");
    }
    td
}

fn codec_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_tdtr");

    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(30);
    group.sampling_mode(SamplingMode::Flat);

    let digests: Vec<TDigest> = (0..DIGESTS as u64).map(synth_digest).collect();
    let encoded: Vec<Vec<u8>> = digests
        .iter()
        .map(|td| td.to_bytes().expect("encode"))
        .collect();
    let total_bytes: usize = encoded.iter().map(Vec::len).sum();
    group.throughput(Throughput::Bytes(total_bytes as u64));

    // Accumulators so the footer reports avg ms/op across all samples.
    let (mut w_secs, mut w_iters) = (0.0_f64, 0_u64);
    let (mut r_secs, mut r_iters) = (0.0_f64, 0_u64);

    group.bench_function("write", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                for td in &digests {
                    black_box(td.to_bytes().expect("encode").len());
                }
            }
            let dur = start.elapsed();
            w_secs += dur.as_secs_f64();
            w_iters += iters;
            dur
        });
    });

    group.bench_function("read", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                for (i, bytes) in encoded.iter().enumerate() {
                    let td = TDigest::from_bytes_with_seed(black_box(bytes), i as u64)
                        .expect("decode");
                    black_box(td.len());
                }
            }
            let dur = start.elapsed();
            r_secs += dur.as_secs_f64();
            r_iters += iters;
            dur
        });
    });

    group.finish();

    let per_iter_ms = |secs: f64, iters: u64| {
        if iters > 0 {
            1e3 * secs / iters as f64
        } else {
            f64::NAN
        }
    };
    let avg_centroids =
        digests.iter().map(TDigest::len).sum::<usize>() as f64 / DIGESTS as f64;

    println!(
        "\n== TDTR codec (DIGESTS={DIGESTS}, avg centroids={avg_centroids:.0}, bytes={total_bytes}) =="
    );
    println!(
        "WRITE {:6.3} ms | READ {:6.3} ms",
        per_iter_ms(w_secs, w_iters),
        per_iter_ms(r_secs, r_iters)
    );
}

criterion_group!(benches, codec_bench);
criterion_main!(benches);
