//! Raw signature verification over the supported schemes

use crate::error::{Error, Result};
use crate::scheme::SigningScheme;
use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, SECP_256_R_1, SECP_384_R_1};
use const_oid::db::rfc8410::ID_ED_25519;
use const_oid::ObjectIdentifier;
use p256::ecdsa::signature::Verifier as _;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

/// A public key resolved to a concrete curve implementation
pub enum VerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl VerifyingKey {
    /// Resolve a key from a SubjectPublicKeyInfo.
    ///
    /// EC keys carry their curve in the algorithm parameters; anything
    /// other than P-256, P-384 or Ed25519 is rejected.
    pub fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let key_bits = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| Error::Certificate("public key has unused bits".to_string()))?;

        if spki.algorithm.oid == ID_EC_PUBLIC_KEY {
            match ec_curve_oid(spki)? {
                oid if oid == SECP_256_R_1 => {
                    let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bits)
                        .map_err(|e| Error::Certificate(format!("invalid P-256 key: {e}")))?;
                    Ok(VerifyingKey::P256(key))
                }
                oid if oid == SECP_384_R_1 => {
                    let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bits)
                        .map_err(|e| Error::Certificate(format!("invalid P-384 key: {e}")))?;
                    Ok(VerifyingKey::P384(key))
                }
                oid => Err(Error::UnsupportedAlgorithm(format!("EC curve {oid}"))),
            }
        } else if spki.algorithm.oid == ID_ED_25519 {
            let key_bytes: [u8; 32] = key_bits
                .try_into()
                .map_err(|_| Error::Certificate("Ed25519 key is not 32 bytes".to_string()))?;
            let key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)
                .map_err(|e| Error::Certificate(format!("invalid Ed25519 key: {e}")))?;
            Ok(VerifyingKey::Ed25519(key))
        } else {
            Err(Error::UnsupportedAlgorithm(format!(
                "key algorithm {}",
                spki.algorithm.oid
            )))
        }
    }

    /// The signing scheme this key verifies under
    pub fn scheme(&self) -> SigningScheme {
        match self {
            VerifyingKey::P256(_) => SigningScheme::EcdsaP256Sha256,
            VerifyingKey::P384(_) => SigningScheme::EcdsaP384Sha384,
            VerifyingKey::Ed25519(_) => SigningScheme::Ed25519,
        }
    }

    /// Verify a fixed-width (raw r||s or Ed25519) signature, the form
    /// COSE carries.
    pub fn verify_raw(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        match self {
            VerifyingKey::P256(key) => {
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                key.verify(message, &sig).map_err(|_| Error::SignatureMismatch)
            }
            VerifyingKey::P384(key) => {
                let sig = p384::ecdsa::Signature::from_slice(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                key.verify(message, &sig).map_err(|_| Error::SignatureMismatch)
            }
            VerifyingKey::Ed25519(key) => {
                let sig = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                key.verify(message, &sig).map_err(|_| Error::SignatureMismatch)
            }
        }
    }

    /// Verify an ASN.1 DER-encoded ECDSA signature, the form X.509
    /// certificates carry. Ed25519 certificate signatures are raw.
    pub fn verify_der(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        match self {
            VerifyingKey::P256(key) => {
                let sig = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                key.verify(message, &sig).map_err(|_| Error::SignatureMismatch)
            }
            VerifyingKey::P384(key) => {
                let sig = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                key.verify(message, &sig).map_err(|_| Error::SignatureMismatch)
            }
            VerifyingKey::Ed25519(_) => self.verify_raw(message, signature),
        }
    }
}

/// Extract the EC curve OID from an EC SubjectPublicKeyInfo
fn ec_curve_oid(spki: &SubjectPublicKeyInfoOwned) -> Result<ObjectIdentifier> {
    let params = spki
        .algorithm
        .parameters
        .as_ref()
        .ok_or_else(|| Error::Certificate("EC key missing curve parameters".to_string()))?;

    ObjectIdentifier::from_bytes(params.value())
        .map_err(|e| Error::Certificate(format!("invalid EC curve OID: {e}")))
}
