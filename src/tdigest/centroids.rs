use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A centroid summarizes a cluster in the digest: one or more nearby samples
/// collapsed into a single weighted point.
///
/// Equality is exact on both fields. Two centroids produced by the same
/// sequence of updates compare equal; there is no epsilon.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Centroid {
    mean: OrderedFloat<f64>,
    count: u64,
}

impl PartialOrd for Centroid {
    fn partial_cmp(&self, other: &Centroid) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Centroid {
    fn cmp(&self, other: &Centroid) -> Ordering {
        // The store never holds duplicate means; ties fall back to count so
        // that `Ord` stays consistent with `Eq`.
        self.mean
            .cmp(&other.mean)
            .then_with(|| self.count.cmp(&other.count))
    }
}

impl Centroid {
    /// # Panics
    ///
    /// Panics if `count` is zero; a centroid always represents at least one sample.
    #[inline]
    pub fn new(mean: f64, count: u64) -> Self {
        assert!(count >= 1, "centroid count must be >= 1");
        Centroid {
            mean: OrderedFloat::from(mean),
            count,
        }
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean.into_inner()
    }
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Store key for this centroid.
    #[inline]
    pub(crate) fn key(&self) -> OrderedFloat<f64> {
        self.mean
    }

    /// Fold `weight` samples located at `x` into this centroid.
    ///
    /// The count is bumped first and the mean moves by `weight * (x - mean) / count'`.
    /// Keep this order: dividing by the new count is what keeps repeated merges
    /// from drifting.
    ///
    /// For finite `x` and a finite mean the result stays finite. When
    /// `x - mean` overflows, the mean is taken as the weighted blend
    /// `mean·(1−t) + x·t` with `t = weight / count'`.
    #[inline]
    pub fn update(&mut self, x: f64, weight: u64) {
        self.count += weight;
        let m0 = self.mean.into_inner();
        let w = weight as f64;
        let n = self.count as f64;
        let mut m1 = m0 + w * (x - m0) / n;
        if !m1.is_finite() && m0.is_finite() && x.is_finite() {
            let t = w / n;
            m1 = m0 * (1.0 - t) + x * t;
        }
        self.mean = OrderedFloat::from(m1);
    }
}

/// Strictly increasing by mean.
#[inline]
pub fn is_sorted_strict_by_mean(cs: &[Centroid]) -> bool {
    cs.windows(2).all(|w| w[0].mean() < w[1].mean())
}
