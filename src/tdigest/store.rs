//! Ordered centroid store.
//!
//! A sorted set of [`Centroid`]s keyed by mean. Keys are unique: the digest
//! merges colliding centroids before they reach [`CentroidStore::insert`].
//! Every lookup hands back a *copy*, so nothing returned here aliases the
//! live structure once a key is deleted.
//!
//! Neighbour queries:
//! - `floor(x)`       → greatest key `<= x`
//! - `ceiling(x)`     → smallest key `>= x`
//! - `predecessor(x)` → greatest key `<  x`
//! - `successor(x)`   → smallest key `>  x`

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use ordered_float::OrderedFloat;

use crate::tdigest::centroids::Centroid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CentroidStore {
    tree: BTreeMap<OrderedFloat<f64>, Centroid>,
}

impl CentroidStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Insert `c` under its mean.
    ///
    /// # Panics
    ///
    /// Panics if a centroid with the same mean is already stored. Callers merge
    /// collisions first; reaching this branch means the key invariant is broken.
    pub fn insert(&mut self, c: Centroid) {
        if let Some(prev) = self.tree.insert(c.key(), c) {
            panic!(
                "centroid store: duplicate mean {} (had count {}, inserting count {})",
                prev.mean(),
                prev.count(),
                c.count()
            );
        }
    }

    /// Exact-key lookup.
    #[inline]
    pub fn find(&self, mean: f64) -> Option<Centroid> {
        self.tree.get(&OrderedFloat(mean)).copied()
    }

    /// Remove and return the centroid stored under `mean`, if any.
    #[inline]
    pub fn delete(&mut self, mean: f64) -> Option<Centroid> {
        self.tree.remove(&OrderedFloat(mean))
    }

    #[inline]
    pub fn min(&self) -> Option<Centroid> {
        self.tree.first_key_value().map(|(_, c)| *c)
    }

    #[inline]
    pub fn max(&self) -> Option<Centroid> {
        self.tree.last_key_value().map(|(_, c)| *c)
    }

    #[inline]
    pub fn floor(&self, mean: f64) -> Option<Centroid> {
        self.tree
            .range(..=OrderedFloat(mean))
            .next_back()
            .map(|(_, c)| *c)
    }

    #[inline]
    pub fn ceiling(&self, mean: f64) -> Option<Centroid> {
        self.tree.range(OrderedFloat(mean)..).next().map(|(_, c)| *c)
    }

    #[inline]
    pub fn predecessor(&self, mean: f64) -> Option<Centroid> {
        self.tree
            .range(..OrderedFloat(mean))
            .next_back()
            .map(|(_, c)| *c)
    }

    #[inline]
    pub fn successor(&self, mean: f64) -> Option<Centroid> {
        self.tree
            .range((Excluded(OrderedFloat(mean)), Unbounded))
            .next()
            .map(|(_, c)| *c)
    }

    /// Ascending in-order traversal. Lazy, so callers stop as soon as they
    /// have what they need (`take_while`, `find`, `break`).
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Centroid> + ExactSizeIterator + '_ {
        self.tree.values()
    }

    /// Centroids with mean strictly below `mean`, ascending.
    #[inline]
    pub fn iter_below(&self, mean: f64) -> impl DoubleEndedIterator<Item = &Centroid> + '_ {
        self.tree.range(..OrderedFloat(mean)).map(|(_, c)| c)
    }

    /// Owned copy of every entry, ascending. Decoupled from the live tree so a
    /// rebuild can mutate a fresh store while walking this list.
    pub fn snapshot(&self) -> Vec<Centroid> {
        self.tree.values().copied().collect()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl FromIterator<Centroid> for CentroidStore {
    /// Collect centroids with pairwise-distinct means.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate mean, same as [`CentroidStore::insert`].
    fn from_iter<I: IntoIterator<Item = Centroid>>(iter: I) -> Self {
        let mut store = CentroidStore::new();
        for c in iter {
            store.insert(c);
        }
        store
    }
}
