//! Error types for the signing path

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Model or store decoding failed
    #[error(transparent)]
    Claim(#[from] credence_claim::Error),

    /// Signing or signature assembly failed
    #[error(transparent)]
    Crypto(#[from] credence_crypto::Error),

    /// Hard-binding computation failed
    #[error(transparent)]
    Types(#[from] credence_types::Error),

    /// An ingredient container failed its pre-flight validation.
    /// Signing over a broken provenance chain is rejected unless the
    /// caller explicitly opts in.
    #[error("ingredient {title} failed validation: {reason}")]
    BrokenIngredient { title: String, reason: String },

    /// Two ingredient stores carry different manifests under one label
    #[error("conflicting manifests for label {0} across ingredients")]
    ConflictingIngredientManifests(String),
}

pub type Result<T> = std::result::Result<T, Error>;
