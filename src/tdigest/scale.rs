//! Cluster-size bound.
//!
//! A centroid sitting at normalized rank `q` may hold at most
//! `4 · W · q · (1 − q) / compression` samples, where `W` is the digest's
//! total weight. The bound peaks at the median and shrinks towards both tails,
//! which is where the extreme-quantile accuracy comes from.

/// Size bound for a centroid at quantile `q`.
#[inline]
pub(crate) fn threshold(total_weight: u64, q: f64, compression: f64) -> f64 {
    (4.0 * total_weight as f64 * q * (1.0 - q)) / compression
}

/// Estimated normalized rank of a centroid with `count` samples that has
/// `weight_below` samples strictly to its left.
#[inline]
pub(crate) fn centroid_quantile(count: u64, weight_below: u64, total_weight: u64) -> f64 {
    (count as f64 / 2.0 + weight_below as f64) / total_weight as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_peaks_at_median_and_vanishes_at_edges() {
        let w = 10_000;
        let c = 100.0;
        assert_eq!(threshold(w, 0.5, c), 100.0);
        assert_eq!(threshold(w, 0.0, c), 0.0);
        assert_eq!(threshold(w, 1.0, c), 0.0);
        assert!(threshold(w, 0.01, c) < threshold(w, 0.1, c));
        assert_eq!(threshold(w, 0.25, c), threshold(w, 0.75, c));
    }

    #[test]
    fn larger_compression_means_smaller_clusters() {
        assert!(threshold(1_000, 0.5, 200.0) < threshold(1_000, 0.5, 10.0));
    }

    #[test]
    fn rank_uses_half_the_centroid() {
        assert_eq!(centroid_quantile(2, 0, 4), 0.25);
        assert_eq!(centroid_quantile(1, 3, 4), 0.875);
    }
}
