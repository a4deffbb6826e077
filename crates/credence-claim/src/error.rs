//! Error types for claim and store decoding

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Structural container failure, fatal for the whole store
    #[error(transparent)]
    Container(#[from] credence_box::Error),

    /// The top-level superbox is not a manifest store
    #[error("top-level box is not a manifest store")]
    NotAManifestStore,

    /// The store decoded but holds no manifests
    #[error("manifest store contains no manifests")]
    EmptyStore,

    /// A manifest superbox has no label
    #[error("manifest superbox at offset {0} has no label")]
    UnlabeledManifest(usize),

    /// Two manifests share a label
    #[error("duplicate manifest label: {0}")]
    DuplicateManifestLabel(String),

    /// A manifest carries more than one claim box
    #[error("manifest {0} has multiple claim boxes")]
    MultipleClaimBoxes(String),

    /// A manifest is missing its claim box
    #[error("manifest {0} has no claim box")]
    MissingClaimBox(String),

    /// A manifest is missing its signature box
    #[error("manifest {0} has no signature box")]
    MissingSignatureBox(String),

    /// The claim payload could not be decoded
    #[error("failed to decode claim in manifest {label}: {reason}")]
    ClaimDecode { label: String, reason: String },

    /// A recognized assertion's payload could not be decoded
    #[error("failed to decode assertion {label}: {reason}")]
    AssertionDecode { label: String, reason: String },

    /// An assertion superbox is missing its label or payload
    #[error("malformed assertion box in manifest {0}")]
    MalformedAssertionBox(String),

    /// CBOR encoding failed
    #[error("CBOR encoding failed: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
