//! Error types for verification
//!
//! Almost every failure during verification is recorded in the
//! [`ValidationReport`](crate::ValidationReport) rather than returned:
//! failures stay local to the assertion, manifest or ingredient branch
//! they occur in. The exception is a store whose container structure
//! cannot be decoded at all — with no trustworthy structure there is
//! nothing to report against, so `verify` returns this error instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The outermost container (or the store inside it) is malformed
    #[error(transparent)]
    Store(#[from] credence_claim::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
