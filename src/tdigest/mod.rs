pub mod centroids;
pub mod codecs;
pub mod quantile;
pub mod store;
pub mod test_helpers;
pub mod wire;

// Internal building blocks
mod scale;
mod tdigest;

// Public surface
pub use centroids::Centroid;
pub use codecs::DigestSnapshot;
pub use store::CentroidStore;
pub use tdigest::{DigestOptions, TDigest, TDigestBuilder, DEFAULT_COMPRESSION};
pub use wire::{WireError, WireResult};
