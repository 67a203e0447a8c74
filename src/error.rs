// src/error.rs
use crate::tdigest::wire::WireError;

/// Library-wide error for tdigest-tree.
#[derive(Debug, thiserror::Error)]
pub enum TdError {
    /// A sample was offered with a zero count. Nothing is recorded.
    #[error("tdigest: illegal datapoint <value: {value:.4}, count: {count}>")]
    IllegalDatapoint { value: f64, count: u32 },

    /// User tried to insert NaN/±inf.
    /// `context` pinpoints where it came from (e.g., "sample value").
    #[error(
        "tdigest: non-finite values are not allowed ({context}). \
hint: clean your data or drop NaN/±inf before adding samples"
    )]
    NonFiniteInput { context: &'static str },

    /// Encoding or decoding the binary representation failed.
    #[error(transparent)]
    Wire(#[from] WireError),
}

pub type TdResult<T> = Result<T, TdError>;
