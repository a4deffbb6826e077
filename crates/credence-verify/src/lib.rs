//! Manifest-store verification
//!
//! This crate provides the main entry point for verifying a content
//! credential against the asset it describes.
//!
//! # Example
//!
//! ```no_run
//! use credence_verify::verify;
//! use credence_trust::TrustConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let asset = std::fs::read("asset.jpg")?;
//! let container = std::fs::read("asset.credence")?;
//! let trust = TrustConfig::new().with_anchors_pem(&std::fs::read("roots.pem")?)?;
//!
//! let report = verify(&asset, &container, &trust)?;
//! println!("verdict: {:?}", report.verdict);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod options;
pub mod report;
pub mod soft_binding;
mod verify;
mod verify_impl;

pub use error::{Error, Result};
pub use options::{MissingHardBinding, VerifyOptions};
pub use report::{
    CheckKind, CheckRecord, ManifestReport, Severity, TrustVerdict, ValidationCode,
    ValidationReport,
};
pub use soft_binding::{
    BlockMeanFingerprint, SoftBindingAlgorithm, SoftBindingRegistry, SoftMatch,
};
pub use verify::{verify, verify_with_options};
