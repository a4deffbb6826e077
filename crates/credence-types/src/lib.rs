//! Core types and data structures for the credence content-credential engine
//!
//! This crate provides the fundamental types shared across the workspace:
//! hash algorithms and range-aware digest helpers, hashed-URI references,
//! and the common error type for model-level failures.

pub mod error;
pub mod hash;
pub mod uri;

pub use error::{Error, Result};
pub use hash::{hash_bytes, hash_with_exclusions, ByteRange, HashAlgorithm};
pub use uri::{assertion_uri, manifest_label_from_uri, manifest_uri, signature_uri, HashedUri};
