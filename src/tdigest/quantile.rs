//! Percentile evaluation for `TDigest`.
//!
//! The target weight `p · W` is located by walking centroids in ascending
//! order. Inside an interior centroid the answer is interpolated across half
//! the gap to each neighbour:
//!
//! ```text
//! delta = succ.mean / 2 − pred.mean / 2
//! value = mean + ((target − below) / count − 0.5) · delta
//! ```
//!
//! # Edge cases
//! - **Empty digest** → **`NaN`**.
//! - **One centroid** → its mean, for every `p`.
//! - **First / last centroid** → its mean exactly; the extremes are never
//!   interpolated.
//! - **`p == 1`** → the largest mean.
//! - **`p` outside `[0, 1]` or NaN** → panic. That is a caller bug, not bad data.

use crate::tdigest::TDigest;

impl TDigest {
    /// Estimate the value below which a fraction `p` of the weight lies.
    ///
    /// # Panics
    ///
    /// Panics unless `0.0 <= p <= 1.0`.
    pub fn percentile(&self, p: f64) -> f64 {
        assert!(
            (0.0..=1.0).contains(&p),
            "percentile must be between 0 and 1 (inclusive), got {}",
            p
        );

        let store = self.store();
        match store.len() {
            0 => return f64::NAN,
            1 => return store.min().map_or(f64::NAN, |c| c.mean()),
            _ => {}
        }

        let target = p * self.total_weight() as f64;
        let last = store.len() - 1;
        let mut below = 0.0;

        for (i, c) in store.iter().enumerate() {
            let count = c.count() as f64;
            if target < below + count {
                if i == 0 || i == last {
                    return c.mean();
                }
                let (Some(pred), Some(succ)) =
                    (store.predecessor(c.mean()), store.successor(c.mean()))
                else {
                    panic!("interior centroid {:?} is missing a neighbour", c);
                };
                // Halve before subtracting: far-apart finite means must not overflow.
                let delta = succ.mean() / 2.0 - pred.mean() / 2.0;
                return c.mean() + ((target - below) / count - 0.5) * delta;
            }
            below += count;
        }

        // Only reachable at the upper boundary (p == 1).
        store.max().map_or(f64::NAN, |c| c.mean())
    }

    /// [`percentile`](Self::percentile) for each entry of `ps`, in order.
    pub fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        ps.iter().map(|&p| self.percentile(p)).collect()
    }

    /// Shorthand for `percentile(0.5)`.
    #[inline]
    pub fn median(&self) -> f64 {
        self.percentile(0.5)
    }
}
