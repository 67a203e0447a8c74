// src/tdigest/tdigest.rs
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::tdigest::centroids::Centroid;
use crate::tdigest::codecs::DigestSnapshot;
use crate::tdigest::scale;
use crate::tdigest::store::CentroidStore;
use crate::{TdError, TdResult};

/// Compression used by [`TDigest::default`] and [`DigestOptions::default`].
pub const DEFAULT_COMPRESSION: f64 = 100.0;

/// The store is rebuilt once it holds more than `SIZE_FACTOR × compression` centroids.
const SIZE_FACTOR: f64 = 20.0;

/* =============================================================================
 * Options / Builder
 * ============================================================================= */

/// Construction parameters for a [`TDigest`].
///
/// Plain data so a host can embed it in its own configuration
/// (`serde` friendly; missing fields fall back to the defaults).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestOptions {
    /// Cluster-size tuning. Larger values keep more centroids and give
    /// more accurate percentiles.
    pub compression: f64,
    /// Seed for the digest's random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            compression: DEFAULT_COMPRESSION,
            seed: None,
        }
    }
}

/// Builder for [`TDigest`].
#[derive(Debug, Clone, Default)]
pub struct TDigestBuilder {
    opts: DigestOptions,
}

impl TDigestBuilder {
    /// Create a new builder with defaults.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression parameter.
    #[inline]
    pub fn compression(mut self, c: f64) -> Self {
        self.opts.compression = c;
        self
    }

    /// Fix the random source so runs are reproducible.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.opts.seed = Some(seed);
        self
    }

    /// Replace all options at once.
    #[inline]
    pub fn options(mut self, opts: DigestOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Build an empty digest.
    ///
    /// # Panics
    ///
    /// Panics if the compression is not finite and positive.
    pub fn build(self) -> TDigest {
        let rng = match self.opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        TDigest::with_rng(self.opts.compression, rng)
    }
}

/* =============================================================================
 * Digest
 * ============================================================================= */

/// Mergeable streaming quantile summary.
///
/// Samples go in through [`TDigest::add`]; nearby samples collapse into
/// centroids whose size is bounded by `4·W·q·(1−q)/compression`, so the tails
/// stay sharp while the middle is summarized coarsely. Digests built on
/// different shards can be folded together with [`TDigest::merge`].
///
/// A digest is single-owner: nothing inside is synchronized. Keep one digest
/// per worker and merge them into an aggregator from a single place.
///
/// ```
/// use tdigest_tree::TDigest;
///
/// let mut td = TDigest::with_seed(100.0, 7);
/// for v in [1.0, 2.0, 3.0] {
///     td.add(v, 1).unwrap();
/// }
/// assert_eq!(td.percentile(0.5), 2.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "DigestSnapshot", try_from = "DigestSnapshot")]
pub struct TDigest {
    store: CentroidStore,
    compression: f64,
    total_weight: u64,
    rng: StdRng,
}

impl Default for TDigest {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION)
    }
}

/// Equality of the summarized state. The random source is not compared.
impl PartialEq for TDigest {
    fn eq(&self, other: &Self) -> bool {
        self.compression == other.compression
            && self.total_weight == other.total_weight
            && self.store == other.store
    }
}

impl TDigest {
    /// Empty digest seeded from the OS.
    ///
    /// The compression parameter rules how eagerly samples get merged: higher
    /// values hold more centroids in memory and answer more precisely.
    ///
    /// # Panics
    ///
    /// Panics if `compression` is not finite and positive.
    #[inline]
    pub fn new(compression: f64) -> Self {
        Self::builder().compression(compression).build()
    }

    /// Empty digest with a deterministic random source.
    #[inline]
    pub fn with_seed(compression: f64, seed: u64) -> Self {
        Self::builder().compression(compression).seed(seed).build()
    }

    /// Entry point for fluent construction.
    #[inline]
    pub fn builder() -> TDigestBuilder {
        TDigestBuilder::default()
    }

    pub(crate) fn with_rng(compression: f64, rng: StdRng) -> Self {
        assert!(
            compression.is_finite() && compression > 0.0,
            "compression must be finite and positive, got {}",
            compression
        );
        TDigest {
            store: CentroidStore::new(),
            compression,
            total_weight: 0,
            rng,
        }
    }

    /// Reassemble a digest from decoded parts. The caller has validated that
    /// `total_weight` equals the sum of the store's counts.
    pub(crate) fn from_parts(
        compression: f64,
        total_weight: u64,
        store: CentroidStore,
        rng: StdRng,
    ) -> Self {
        let mut td = Self::with_rng(compression, rng);
        debug_assert_eq!(
            store.iter().map(|c| c.count()).sum::<u64>(),
            total_weight,
            "total weight out of sync with centroids"
        );
        td.store = store;
        td.total_weight = total_weight;
        td
    }

    /* ===========================
     * Accessors
     * =========================== */

    /// The configured compression parameter.
    #[inline]
    pub fn compression(&self) -> f64 {
        self.compression
    }

    /// Total weight (∑ counts). For unit samples this equals the sample count.
    #[inline]
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Number of centroids currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Centroids in ascending mean order.
    #[inline]
    pub fn centroids(&self) -> impl ExactSizeIterator<Item = Centroid> + '_ {
        self.store.iter().copied()
    }

    /// Smallest centroid mean.
    #[inline]
    pub fn min(&self) -> Option<f64> {
        self.store.min().map(|c| c.mean())
    }

    /// Largest centroid mean.
    #[inline]
    pub fn max(&self) -> Option<f64> {
        self.store.max().map(|c| c.mean())
    }

    #[inline]
    pub(crate) fn store(&self) -> &CentroidStore {
        &self.store
    }

    /* ===========================
     * Ingest
     * =========================== */

    /// Register `count` occurrences of `value`.
    ///
    /// The most common count is 1; larger counts record a value that was seen
    /// several times. A zero count is rejected without touching the digest, as
    /// are NaN and ±inf values.
    pub fn add(&mut self, value: f64, count: u32) -> TdResult<()> {
        if count == 0 {
            return Err(TdError::IllegalDatapoint { value, count });
        }
        if !value.is_finite() {
            return Err(TdError::NonFiniteInput {
                context: "sample value",
            });
        }

        let count = u64::from(count);
        self.total_weight += count;
        self.insert_weighted(value, count);
        self.maybe_compress();
        Ok(())
    }

    /// Add each value once. Stops at the first rejected value; values before it
    /// stay recorded.
    pub fn add_many<I: IntoIterator<Item = f64>>(&mut self, values: I) -> TdResult<()> {
        for v in values {
            self.add(v, 1)?;
        }
        Ok(())
    }

    /// Rebuild the store by re-inserting every centroid in random order.
    ///
    /// Runs automatically once the store outgrows `20 × compression`. Never
    /// grows the store and never changes the total weight.
    pub fn compress(&mut self) {
        if self.store.len() <= 1 {
            return;
        }

        let mut nodes = std::mem::take(&mut self.store).snapshot();
        let before = nodes.len();
        nodes.shuffle(&mut self.rng);

        // The total weight already accounts for every node; the rebuild only
        // redistributes it.
        for c in nodes {
            self.insert_weighted(c.mean(), c.count());
        }

        debug!(
            before,
            after = self.store.len(),
            total_weight = self.total_weight,
            compression = self.compression,
            "compressed digest"
        );
    }

    /// Fold `other` into `self`. `other` is left untouched.
    ///
    /// Useful when several digests are built in parallel (one per thread,
    /// shard or time window) and percentiles are wanted over all of them.
    pub fn merge(&mut self, other: &TDigest) {
        if other.is_empty() {
            return;
        }

        let mut nodes = other.store.snapshot();
        let incoming = nodes.len();
        nodes.shuffle(&mut self.rng);

        for c in nodes {
            self.total_weight += c.count();
            self.insert_weighted(c.mean(), c.count());
            self.maybe_compress();
        }

        trace!(
            incoming,
            centroids = self.store.len(),
            total_weight = self.total_weight,
            "merged digest"
        );
    }

    /// Merge several digests into `self`, one after the other.
    pub fn merge_many(&mut self, others: &[TDigest]) {
        for other in others {
            self.merge(other);
        }
    }

    /// Merge a batch of digests into a new one.
    ///
    /// The result takes its compression and random source from the first
    /// digest; an empty batch yields [`TDigest::default`].
    pub fn merge_digests(digests: Vec<TDigest>) -> TDigest {
        let mut iter = digests.into_iter();
        let Some(mut acc) = iter.next() else {
            return TDigest::default();
        };
        for d in iter {
            acc.merge(&d);
        }
        acc
    }

    /* ===========================
     * Insertion internals
     * =========================== */

    #[inline]
    fn maybe_compress(&mut self) {
        if self.store.len() as f64 > SIZE_FACTOR * self.compression {
            self.compress();
        }
    }

    /// Place `count` samples at `value`. `total_weight` must already include them.
    fn insert_weighted(&mut self, value: f64, mut count: u64) {
        if self.store.is_empty() {
            self.add_centroid(Centroid::new(value, count));
            return;
        }

        let mut candidates = self.nearest_centroids(value);

        while !candidates.is_empty() && count > 0 {
            let j = self.rng.random_range(0..candidates.len());
            let chosen = candidates.swap_remove(j);

            let q = self.centroid_quantile(&chosen);
            let limit = scale::threshold(self.total_weight, q, self.compression);

            if (chosen.count() + count) as f64 > limit {
                continue;
            }

            let delta = (limit - chosen.count() as f64).min(count as f64) as u64;
            if delta > 0 {
                self.update_centroid(chosen, value, delta);
                count -= delta;
            }
        }

        if count > 0 {
            self.add_centroid(Centroid::new(value, count));
        }
    }

    /// Floor/ceiling of `value`: both when they are equidistant and distinct,
    /// otherwise whichever is closer.
    fn nearest_centroids(&self, value: f64) -> Vec<Centroid> {
        match (self.store.floor(value), self.store.ceiling(value)) {
            (Some(floor), Some(ceil)) => {
                let d_floor = (floor.mean() - value).abs();
                let d_ceil = (ceil.mean() - value).abs();
                if d_floor < d_ceil {
                    vec![floor]
                } else if d_floor == d_ceil && floor != ceil {
                    vec![floor, ceil]
                } else {
                    vec![ceil]
                }
            }
            (Some(floor), None) => vec![floor],
            (None, Some(ceil)) => vec![ceil],
            (None, None) => panic!("nearest_centroids called on an empty store"),
        }
    }

    /// Normalized rank of `c`: half its own count plus everything strictly
    /// to its left, over the total weight.
    fn centroid_quantile(&self, c: &Centroid) -> f64 {
        let below: u64 = self.store.iter_below(c.mean()).map(|x| x.count()).sum();
        scale::centroid_quantile(c.count(), below, self.total_weight)
    }

    /// Move `weight` samples at `value` into the stored centroid `c`.
    ///
    /// The mean is the key, so the entry is pulled out, updated and re-added.
    fn update_centroid(&mut self, c: Centroid, value: f64, weight: u64) {
        let Some(mut current) = self.store.delete(c.mean()) else {
            panic!(
                "trying to update a centroid that doesn't exist: {:?} (centroids={}, total_weight={})",
                c,
                self.store.len(),
                self.total_weight
            );
        };
        current.update(value, weight);
        self.add_centroid(current);
    }

    /// Insert `c`, folding it into an existing centroid with the same mean.
    fn add_centroid(&mut self, mut c: Centroid) {
        if let Some(existing) = self.store.delete(c.mean()) {
            c.update(existing.mean(), existing.count());
        }
        self.store.insert(c);
    }
}
