//! Content credentials for digital media assets
//!
//! `credence` establishes and verifies cryptographically signed
//! provenance records embedded in or attached to digital media: who
//! created or edited an asset, what actions were applied, and whether
//! the asset's bytes are unaltered since the claim was made.
//!
//! The workspace splits into one crate per concern; this crate
//! re-exports the public surface. The two entry points are
//! [`verify`] and [`sign`] (or [`ManifestBuilder`] for full control
//! over the claim): both are pure functions of their inputs plus the
//! injected trust or signing capability.
//!
//! # Verifying
//!
//! ```no_run
//! use credence::{verify, TrustConfig, TrustVerdict};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let asset = std::fs::read("asset.jpg")?;
//! let container = std::fs::read("asset.credence")?;
//! let trust = TrustConfig::new().with_anchors_pem(&std::fs::read("roots.pem")?)?;
//!
//! let report = verify(&asset, &container, &trust)?;
//! if report.verdict == TrustVerdict::Trusted {
//!     println!("provenance intact, signed by a trusted credential");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Signing
//!
//! ```no_run
//! use credence::claim::{Action, Actions, Assertion};
//! use credence::{Ed25519Signer, ManifestBuilder};
//!
//! # fn example(signer: Ed25519Signer) -> Result<(), Box<dyn std::error::Error>> {
//! let asset = std::fs::read("asset.jpg")?;
//! let container = ManifestBuilder::new("my-editor/1.0", "image/jpeg", "xmp:iid:1234")
//!     .add_assertion(Assertion::Actions(Actions {
//!         actions: vec![Action {
//!             action: "credence.created".to_string(),
//!             when: None,
//!             software_agent: Some("my-editor/1.0".to_string()),
//!             parameters: None,
//!         }],
//!     }))
//!     .sign(&asset, &signer)?;
//! std::fs::write("asset.credence", container)?;
//! # Ok(())
//! # }
//! ```

// The member crates, under their concern names
pub use credence_box as container;
pub use credence_claim as claim;
pub use credence_crypto as crypto;
pub use credence_sign as signing;
pub use credence_trust as trust;
pub use credence_types as types;
pub use credence_verify as verification;

// The flat public surface
pub use credence_claim::{Assertion, Claim, Manifest, ManifestStore};
pub use credence_crypto::{CoseSign1, EcdsaP256Signer, Ed25519Signer, Signer, SigningScheme};
pub use credence_sign::{sign, IngredientInput, ManifestBuilder};
pub use credence_trust::{
    RevocationChecker, RevocationPolicy, RevocationStatus, SigningTimePolicy,
    StaticRevocationList, TrustConfig,
};
pub use credence_types::{ByteRange, HashAlgorithm, HashedUri};
pub use credence_verify::{
    verify, verify_with_options, CheckKind, CheckRecord, ManifestReport, MissingHardBinding,
    Severity, SoftBindingRegistry, TrustVerdict, ValidationCode, ValidationReport, VerifyOptions,
};
