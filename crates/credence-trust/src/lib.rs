//! Trust configuration for credence verification
//!
//! A [`TrustConfig`] carries everything a verification call needs to
//! decide whether a signing credential is trusted: the root anchors, an
//! optional intermediate allow-list, the revocation policy and its
//! checker capability, and the clock-skew tolerance. It is supplied by
//! the caller at verification start and never mutated mid-verification,
//! so parallel verifications can share one config or use different ones
//! freely.

pub mod config;
pub mod error;
pub mod revocation;

pub use config::{SigningTimePolicy, TrustConfig, DEFAULT_CLOCK_SKEW_SECONDS};
pub use error::{Error, Result};
pub use revocation::{
    NoRevocationChecker, RevocationChecker, RevocationPolicy, RevocationStatus,
    StaticRevocationList,
};
