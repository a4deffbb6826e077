//! The signing capability
//!
//! Key custody stays with the caller: the engine only ever sees the
//! [`Signer`] trait. The bundled implementations cover keys the caller
//! already holds in memory; external signers (HSMs, remote services)
//! implement the same trait.

use crate::error::{Error, Result};
use crate::scheme::SigningScheme;
use chrono::{DateTime, Utc};
use ed25519_dalek::Signer as _;

/// A signing capability supplied by the caller.
///
/// `sign` receives the exact bytes to be signed and returns a raw
/// (fixed-width) signature under [`Signer::scheme`]. `cert_chain`
/// returns the DER certificate chain, leaf first.
pub trait Signer {
    /// The scheme signatures are produced under
    fn scheme(&self) -> SigningScheme;

    /// Sign the given bytes
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// DER certificate chain, leaf certificate first
    fn cert_chain(&self) -> Result<Vec<Vec<u8>>>;

    /// Optional signing-time attestation embedded in the signature
    fn signing_time(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Local Ed25519 signing key with its certificate chain
pub struct Ed25519Signer {
    key: ed25519_dalek::SigningKey,
    certs: Vec<Vec<u8>>,
    signing_time: Option<DateTime<Utc>>,
}

impl Ed25519Signer {
    pub fn new(key: ed25519_dalek::SigningKey, certs: Vec<Vec<u8>>) -> Self {
        Self {
            key,
            certs,
            signing_time: None,
        }
    }

    /// Attach a signing-time attestation to produced signatures
    pub fn with_signing_time(mut self, time: DateTime<Utc>) -> Self {
        self.signing_time = Some(time);
        self
    }
}

impl Signer for Ed25519Signer {
    fn scheme(&self) -> SigningScheme {
        SigningScheme::Ed25519
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(message).to_bytes().to_vec())
    }

    fn cert_chain(&self) -> Result<Vec<Vec<u8>>> {
        if self.certs.is_empty() {
            return Err(Error::Signing("signer has no certificate chain".to_string()));
        }
        Ok(self.certs.clone())
    }

    fn signing_time(&self) -> Option<DateTime<Utc>> {
        self.signing_time
    }
}

/// Local ECDSA P-256 signing key with its certificate chain
pub struct EcdsaP256Signer {
    key: p256::ecdsa::SigningKey,
    certs: Vec<Vec<u8>>,
    signing_time: Option<DateTime<Utc>>,
}

impl EcdsaP256Signer {
    pub fn new(key: p256::ecdsa::SigningKey, certs: Vec<Vec<u8>>) -> Self {
        Self {
            key,
            certs,
            signing_time: None,
        }
    }

    pub fn with_signing_time(mut self, time: DateTime<Utc>) -> Self {
        self.signing_time = Some(time);
        self
    }
}

impl Signer for EcdsaP256Signer {
    fn scheme(&self) -> SigningScheme {
        SigningScheme::EcdsaP256Sha256
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let signature: p256::ecdsa::Signature = self.key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }

    fn cert_chain(&self) -> Result<Vec<Vec<u8>>> {
        if self.certs.is_empty() {
            return Err(Error::Signing("signer has no certificate chain".to_string()));
        }
        Ok(self.certs.clone())
    }

    fn signing_time(&self) -> Option<DateTime<Utc>> {
        self.signing_time
    }
}
