//! Streaming, mergeable t-digest for approximate percentiles.
//!
//! Build one [`TDigest`] per worker or shard, feed it with
//! [`TDigest::add`], fold the results together with [`TDigest::merge`] and
//! ship digests between processes with [`TDigest::to_bytes`] /
//! [`TDigest::from_bytes`].
//!
//! ```
//! use tdigest_tree::TDigest;
//!
//! let mut left = TDigest::with_seed(100.0, 1);
//! let mut right = TDigest::with_seed(100.0, 2);
//! left.add_many((0..500).map(f64::from))?;
//! right.add_many((500..1000).map(f64::from))?;
//!
//! let bytes = right.to_bytes()?;
//! left.merge(&TDigest::from_bytes(&bytes)?);
//!
//! assert_eq!(left.total_weight(), 1000);
//! assert!((left.percentile(0.5) - 500.0).abs() < 50.0);
//! # Ok::<(), tdigest_tree::TdError>(())
//! ```
pub mod error;
pub mod tdigest;

pub use error::{TdError, TdResult};
pub use tdigest::{
    Centroid, CentroidStore, DigestOptions, DigestSnapshot, TDigest, TDigestBuilder, WireError,
    WireResult, DEFAULT_COMPRESSION,
};
