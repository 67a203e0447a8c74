//! tdigest-testdata
//! Seeded synthetic streams shared by the tdigest-tree tests and benches.
//! Every generator is deterministic for a given seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, StandardNormal};

/// Shape of a generated stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistKind {
    /// Uniform in \[0,1)
    Uniform,
    /// Gaussian with the given mean and standard deviation, unclamped
    Normal { mean: f64, sd: f64 },
    /// Standard exponential scaled by `scale`: a long right tail
    Exponential { scale: f64 },
    /// Clumps of near-identical values plus a broad uniform floor
    Mixture,
    /// `0, 1, 2, ...` in ascending order
    Sequential,
}

/// Generate `n` samples of the chosen shape.
pub fn gen_dataset(kind: DistKind, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);

    match kind {
        DistKind::Uniform => {
            for _ in 0..n {
                out.push(rng.random::<f64>());
            }
        }
        DistKind::Normal { mean, sd } => {
            for _ in 0..n {
                let z: f64 = StandardNormal.sample(&mut rng);
                out.push(mean + sd * z);
            }
        }
        DistKind::Exponential { scale } => {
            for _ in 0..n {
                let e: f64 = Exp1.sample(&mut rng);
                out.push(scale * e);
            }
        }
        DistKind::Mixture => {
            for _ in 0..n {
                let bucket: u32 = rng.random_range(0..100);
                let v = match bucket {
                    // Clumps around 0.1, 0.5, 0.9 with micro-noise
                    0..=39 => {
                        let center = match rng.random_range(0..3) {
                            0 => 0.10,
                            1 => 0.50,
                            _ => 0.90,
                        };
                        center + rng.random_range(-1.0..1.0) * 1e-3
                    }
                    _ => rng.random::<f64>(),
                };
                out.push(v);
            }
        }
        DistKind::Sequential => out.extend((0..n).map(|i| i as f64)),
    }
    out
}

/// Like [`gen_dataset`], with a repeat count in `1..=max_count` per value.
pub fn gen_weighted(kind: DistKind, n: usize, max_count: u32, seed: u64) -> Vec<(f64, u32)> {
    assert!(max_count >= 1, "max_count must be >= 1");
    let values = gen_dataset(kind, n, seed);
    let mut rng = StdRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
    values
        .into_iter()
        .map(|v| (v, rng.random_range(1..=max_count)))
        .collect()
}

/// Shuffle `values` and deal them round-robin into `shards` disjoint parts.
pub fn split_shards(values: &[f64], shards: usize, seed: u64) -> Vec<Vec<f64>> {
    assert!(shards >= 1, "need at least one shard");
    let mut shuffled = values.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut out = vec![Vec::with_capacity(values.len() / shards + 1); shards];
    for (i, v) in shuffled.into_iter().enumerate() {
        out[i % shards].push(v);
    }
    out
}

/// Expand weighted samples and sort them ascending.
pub fn sorted_expanded(samples: &[(f64, u32)]) -> Vec<f64> {
    let mut out: Vec<f64> = samples
        .iter()
        .flat_map(|&(v, c)| std::iter::repeat_n(v, c as usize))
        .collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}
