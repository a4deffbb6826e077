//! Error types for cryptographic operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An algorithm identifier is not one this engine supports
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The declared algorithm does not match the key material
    #[error("algorithm/key mismatch: {0}")]
    KeyMismatch(String),

    /// The signature bytes did not verify over the message
    #[error("signature verification failed")]
    SignatureMismatch,

    /// The COSE structure could not be decoded
    #[error("malformed COSE signature: {0}")]
    Cose(String),

    /// A certificate could not be parsed or interpreted
    #[error("certificate error: {0}")]
    Certificate(String),

    /// The injected signing capability failed
    #[error("signing failed: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
