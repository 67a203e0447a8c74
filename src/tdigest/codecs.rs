//! Serde bridge for `TDigest`.
//!
//! A digest serializes as a plain [`DigestSnapshot`]:
//! `{ compression, total_weight, centroids: [{ mean, count }, ...] }`.
//! Deserialization runs the same checks as the binary decoder, so a
//! snapshot from an untrusted source either yields a valid digest or fails.
//! The random source is never serialized; a deserialized digest seeds a
//! fresh one from the OS.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::tdigest::centroids::Centroid;
use crate::tdigest::wire::{store_from_parts, WireError};
use crate::tdigest::TDigest;

/// Owned, serde-friendly view of a digest's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestSnapshot {
    pub compression: f64,
    pub total_weight: u64,
    /// Ascending by mean.
    pub centroids: Vec<Centroid>,
}

impl From<&TDigest> for DigestSnapshot {
    fn from(td: &TDigest) -> Self {
        DigestSnapshot {
            compression: td.compression(),
            total_weight: td.total_weight(),
            centroids: td.store().snapshot(),
        }
    }
}

impl From<TDigest> for DigestSnapshot {
    fn from(td: TDigest) -> Self {
        DigestSnapshot::from(&td)
    }
}

impl TryFrom<DigestSnapshot> for TDigest {
    type Error = WireError;

    fn try_from(s: DigestSnapshot) -> Result<Self, Self::Error> {
        let store = store_from_parts(s.compression, s.total_weight, &s.centroids)?;
        Ok(TDigest::from_parts(
            s.compression,
            s.total_weight,
            store,
            StdRng::from_os_rng(),
        ))
    }
}

impl TDigest {
    /// Copy the summarized state out of the digest.
    #[inline]
    pub fn snapshot(&self) -> DigestSnapshot {
        DigestSnapshot::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TDigest {
        let mut td = TDigest::with_seed(64.0, 5);
        for i in 0..2_000 {
            td.add(((i * 7919) % 1000) as f64 / 10.0, 1 + (i % 3) as u32)
                .unwrap();
        }
        td
    }

    #[test]
    fn snapshot_mirrors_digest() {
        let td = sample();
        let snap = td.snapshot();
        assert_eq!(snap.compression, 64.0);
        assert_eq!(snap.total_weight, td.total_weight());
        assert_eq!(snap.centroids.len(), td.len());
        assert_eq!(snap.centroids, td.centroids().collect::<Vec<_>>());
    }

    #[test]
    fn snapshot_converts_back() {
        let td = sample();
        let back = TDigest::try_from(td.snapshot()).unwrap();
        assert_eq!(back, td);
    }

    #[test]
    fn bincode_roundtrip() {
        let td = sample();
        let cfg = bincode::config::standard();
        let bytes = bincode::serde::encode_to_vec(&td, cfg).unwrap();
        let (back, read): (TDigest, usize) = bincode::serde::decode_from_slice(&bytes, cfg).unwrap();
        assert_eq!(read, bytes.len());
        assert_eq!(back, td);
        assert_eq!(back.percentile(0.5), td.percentile(0.5));
    }

    #[test]
    fn invalid_snapshots_are_rejected() {
        let mut snap = sample().snapshot();
        snap.total_weight += 1;
        assert!(matches!(
            TDigest::try_from(snap),
            Err(WireError::InvalidHeader(_))
        ));

        let mut snap = sample().snapshot();
        snap.centroids.reverse();
        assert!(TDigest::try_from(snap).is_err());

        let mut snap = sample().snapshot();
        snap.compression = -3.0;
        assert!(TDigest::try_from(snap).is_err());
    }

    #[test]
    fn tampered_bincode_fails_to_deserialize() {
        let mut snap = sample().snapshot();
        snap.centroids.swap(0, 1);
        let cfg = bincode::config::standard();
        let bytes = bincode::serde::encode_to_vec(&snap, cfg).unwrap();
        let res: Result<(TDigest, usize), _> = bincode::serde::decode_from_slice(&bytes, cfg);
        assert!(res.is_err());
    }
}
