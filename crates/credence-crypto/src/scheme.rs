//! Supported signing schemes
//!
//! Each scheme pairs a curve with the hash its COSE algorithm mandates.
//! Mixed curve/hash combinations are rejected rather than guessed at.

use crate::error::{Error, Result};
use std::fmt;

/// COSE algorithm identifier for ES256 (ECDSA P-256 with SHA-256)
pub const COSE_ALG_ES256: i64 = -7;
/// COSE algorithm identifier for EdDSA (Ed25519)
pub const COSE_ALG_EDDSA: i64 = -8;
/// COSE algorithm identifier for ES384 (ECDSA P-384 with SHA-384)
pub const COSE_ALG_ES384: i64 = -35;

/// A supported signature scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningScheme {
    /// ECDSA over P-256 with SHA-256
    EcdsaP256Sha256,
    /// ECDSA over P-384 with SHA-384
    EcdsaP384Sha384,
    /// Ed25519
    Ed25519,
}

impl SigningScheme {
    /// COSE algorithm identifier for the protected header
    pub fn cose_alg(&self) -> i64 {
        match self {
            SigningScheme::EcdsaP256Sha256 => COSE_ALG_ES256,
            SigningScheme::EcdsaP384Sha384 => COSE_ALG_ES384,
            SigningScheme::Ed25519 => COSE_ALG_EDDSA,
        }
    }

    /// Resolve a COSE algorithm identifier
    pub fn from_cose_alg(alg: i64) -> Result<Self> {
        match alg {
            COSE_ALG_ES256 => Ok(SigningScheme::EcdsaP256Sha256),
            COSE_ALG_ES384 => Ok(SigningScheme::EcdsaP384Sha384),
            COSE_ALG_EDDSA => Ok(SigningScheme::Ed25519),
            other => Err(Error::UnsupportedAlgorithm(format!(
                "COSE algorithm {other}"
            ))),
        }
    }

    /// Human-readable scheme name
    pub fn name(&self) -> &'static str {
        match self {
            SigningScheme::EcdsaP256Sha256 => "es256",
            SigningScheme::EcdsaP384Sha384 => "es384",
            SigningScheme::Ed25519 => "ed25519",
        }
    }

    /// Length of a raw (fixed-width) signature under this scheme
    pub fn raw_signature_len(&self) -> usize {
        match self {
            SigningScheme::EcdsaP256Sha256 => 64,
            SigningScheme::EcdsaP384Sha384 => 96,
            SigningScheme::Ed25519 => 64,
        }
    }
}

impl fmt::Display for SigningScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cose_alg_round_trip() {
        for scheme in [
            SigningScheme::EcdsaP256Sha256,
            SigningScheme::EcdsaP384Sha384,
            SigningScheme::Ed25519,
        ] {
            assert_eq!(SigningScheme::from_cose_alg(scheme.cose_alg()).unwrap(), scheme);
        }
    }

    #[test]
    fn test_unknown_alg_rejected() {
        assert!(matches!(
            SigningScheme::from_cose_alg(-257),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
