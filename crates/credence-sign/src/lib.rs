//! Manifest building and signing
//!
//! The signing path assembles a claim from caller-supplied assertions
//! and ingredient references, computes the hard binding over the target
//! asset, serializes the claim deterministically, signs it through the
//! injected [`Signer`](credence_crypto::Signer) capability and emits
//! container bytes ready for embedding by an asset-format collaborator.

pub mod builder;
pub mod error;

pub use builder::{sign, IngredientInput, ManifestBuilder};
pub use error::{Error, Result};
