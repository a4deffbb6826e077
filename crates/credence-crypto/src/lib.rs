//! Cryptographic primitives for the credence engine
//!
//! This crate owns the COSE `Sign1` codec used for claim signatures, the
//! supported signing schemes, raw signature verification over the
//! supported curves, and the X.509 parsing and chain-link primitives the
//! trust verifier builds on.
//!
//! Key custody stays outside the engine: signing is the [`Signer`]
//! capability trait, implemented by callers (or by the bundled
//! local-key signers for keys the caller already holds in memory).

pub mod cose;
pub mod error;
pub mod scheme;
pub mod signer;
pub mod verify;
pub mod x509;

pub use cose::CoseSign1;
pub use error::{Error, Result};
pub use scheme::SigningScheme;
pub use signer::{EcdsaP256Signer, Ed25519Signer, Signer};
pub use verify::VerifyingKey;
pub use x509::{extract_tbs_der, parse_certificate_info, verify_issued_by, CertificateInfo};
