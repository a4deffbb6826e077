//! Error types for the credence type layer

use thiserror::Error;

/// Errors raised by model-level types
#[derive(Debug, Error)]
pub enum Error {
    /// A hash algorithm label was not recognized
    #[error("unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    /// An exclusion range does not fit inside the data it applies to
    #[error("exclusion range {start}+{length} exceeds data length {data_len}")]
    RangeOutOfBounds {
        start: u64,
        length: u64,
        data_len: u64,
    },

    /// Exclusion ranges overlap
    #[error("exclusion range starting at {0} overlaps the previous range")]
    RangeOverlap(u64),

    /// A URI did not match the expected manifest-reference shape
    #[error("invalid manifest URI: {0}")]
    InvalidUri(String),
}

pub type Result<T> = std::result::Result<T, Error>;
