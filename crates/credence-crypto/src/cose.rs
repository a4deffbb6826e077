//! COSE `Sign1` codec for claim signatures
//!
//! Claim signatures travel as a COSE `Sign1` structure (RFC 9052 §4.2)
//! with a detached payload: the signed bytes are the claim exactly as
//! stored in its box, never re-encoded. The protected header carries the
//! algorithm, the DER certificate chain (`x5chain`, leaf first) and the
//! optional signing-time attestation, so all three are covered by the
//! signature.

use crate::error::{Error, Result};
use crate::scheme::SigningScheme;
use crate::signer::Signer;
use crate::verify::VerifyingKey;
use crate::x509::parse_certificate_info;
use chrono::{DateTime, TimeZone, Utc};
use ciborium::Value;

/// COSE header label for the algorithm
const HEADER_ALG: i64 = 1;
/// COSE header label for the certificate chain
const HEADER_X5CHAIN: i64 = 33;
/// Header label for the signing-time attestation (epoch seconds)
const HEADER_SIGNING_TIME: &str = "signing-time";

/// CBOR tag for COSE_Sign1
const TAG_SIGN1: u64 = 18;

/// A decoded COSE `Sign1` signature with detached payload
#[derive(Debug, Clone)]
pub struct CoseSign1 {
    /// Encoded protected header bytes, exactly as signed
    pub protected: Vec<u8>,
    /// Algorithm declared in the protected header
    pub scheme: SigningScheme,
    /// DER certificate chain from the protected header, leaf first
    pub cert_chain: Vec<Vec<u8>>,
    /// Signing-time attestation, when present
    pub signing_time: Option<DateTime<Utc>>,
    /// Raw signature bytes
    pub signature: Vec<u8>,
}

impl CoseSign1 {
    /// Produce a signature over `payload` with the injected signer.
    pub fn sign(payload: &[u8], signer: &dyn Signer) -> Result<Self> {
        let scheme = signer.scheme();
        let cert_chain = signer.cert_chain()?;
        let signing_time = signer.signing_time();

        let protected = encode_protected(scheme, &cert_chain, signing_time)?;
        let to_sign = sig_structure(&protected, payload)?;
        let signature = signer.sign(&to_sign)?;

        if signature.len() != scheme.raw_signature_len() {
            return Err(Error::Signing(format!(
                "signer returned {} bytes, expected {} for {scheme}",
                signature.len(),
                scheme.raw_signature_len(),
            )));
        }

        Ok(Self {
            protected,
            scheme,
            cert_chain,
            signing_time,
            signature,
        })
    }

    /// Decode a COSE `Sign1` from its CBOR encoding.
    ///
    /// The payload slot must be null: signatures here are always
    /// detached from the claim bytes they cover.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = ciborium::from_reader(bytes)
            .map_err(|e| Error::Cose(format!("decode: {e}")))?;

        let array = match value {
            Value::Tag(TAG_SIGN1, inner) => match *inner {
                Value::Array(array) => array,
                _ => return Err(Error::Cose("tag 18 must contain an array".to_string())),
            },
            Value::Array(array) => array,
            _ => return Err(Error::Cose("expected COSE_Sign1 array".to_string())),
        };

        if array.len() != 4 {
            return Err(Error::Cose(format!(
                "COSE_Sign1 must have 4 elements, got {}",
                array.len()
            )));
        }

        let protected = match &array[0] {
            Value::Bytes(b) => b.clone(),
            _ => return Err(Error::Cose("protected header must be a byte string".to_string())),
        };

        if !matches!(&array[2], Value::Null) {
            return Err(Error::Cose("payload must be detached (null)".to_string()));
        }

        let signature = match &array[3] {
            Value::Bytes(b) => b.clone(),
            _ => return Err(Error::Cose("signature must be a byte string".to_string())),
        };

        let (scheme, cert_chain, signing_time) = decode_protected(&protected)?;

        Ok(Self {
            protected,
            scheme,
            cert_chain,
            signing_time,
            signature,
        })
    }

    /// Encode to CBOR (tag 18, detached payload).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let array = Value::Array(vec![
            Value::Bytes(self.protected.clone()),
            Value::Map(Vec::new()),
            Value::Null,
            Value::Bytes(self.signature.clone()),
        ]);
        let tagged = Value::Tag(TAG_SIGN1, Box::new(array));

        let mut out = Vec::new();
        ciborium::into_writer(&tagged, &mut out)
            .map_err(|e| Error::Cose(format!("encode: {e}")))?;
        Ok(out)
    }

    /// Verify the signature over the detached `payload` using the leaf
    /// certificate's public key.
    ///
    /// The declared algorithm must match the leaf key type; a mismatch
    /// is rejected rather than coerced.
    pub fn verify(&self, payload: &[u8]) -> Result<()> {
        let leaf = self
            .cert_chain
            .first()
            .ok_or_else(|| Error::Cose("empty certificate chain".to_string()))?;

        let info = parse_certificate_info(leaf)?;
        let key = VerifyingKey::from_spki(&info.spki)?;

        if key.scheme() != self.scheme {
            return Err(Error::KeyMismatch(format!(
                "declared {} but leaf key is {}",
                self.scheme,
                key.scheme()
            )));
        }

        let message = sig_structure(&self.protected, payload)?;
        key.verify_raw(&message, &self.signature)
    }
}

/// Build the `Sig_structure` bytes (RFC 9052 §4.4) for a detached payload
fn sig_structure(protected: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let structure = Value::Array(vec![
        Value::Text("Signature1".to_string()),
        Value::Bytes(protected.to_vec()),
        Value::Bytes(Vec::new()),
        Value::Bytes(payload.to_vec()),
    ]);

    let mut out = Vec::new();
    ciborium::into_writer(&structure, &mut out)
        .map_err(|e| Error::Cose(format!("encode Sig_structure: {e}")))?;
    Ok(out)
}

fn encode_protected(
    scheme: SigningScheme,
    cert_chain: &[Vec<u8>],
    signing_time: Option<DateTime<Utc>>,
) -> Result<Vec<u8>> {
    if cert_chain.is_empty() {
        return Err(Error::Cose("certificate chain is empty".to_string()));
    }

    let chain = Value::Array(
        cert_chain
            .iter()
            .map(|der| Value::Bytes(der.clone()))
            .collect(),
    );

    let mut entries = vec![
        (Value::Integer(HEADER_ALG.into()), Value::Integer(scheme.cose_alg().into())),
        (Value::Integer(HEADER_X5CHAIN.into()), chain),
    ];
    if let Some(time) = signing_time {
        entries.push((
            Value::Text(HEADER_SIGNING_TIME.to_string()),
            Value::Integer(time.timestamp().into()),
        ));
    }

    let mut out = Vec::new();
    ciborium::into_writer(&Value::Map(entries), &mut out)
        .map_err(|e| Error::Cose(format!("encode protected header: {e}")))?;
    Ok(out)
}

type ProtectedFields = (SigningScheme, Vec<Vec<u8>>, Option<DateTime<Utc>>);

fn decode_protected(protected: &[u8]) -> Result<ProtectedFields> {
    let value: Value = ciborium::from_reader(protected)
        .map_err(|e| Error::Cose(format!("decode protected header: {e}")))?;
    let map = match value {
        Value::Map(map) => map,
        _ => return Err(Error::Cose("protected header must be a map".to_string())),
    };

    let mut alg: Option<i64> = None;
    let mut chain: Option<Vec<Vec<u8>>> = None;
    let mut signing_time: Option<DateTime<Utc>> = None;

    for (key, val) in map {
        match key {
            Value::Integer(n) if i128::from(n) == i128::from(HEADER_ALG) => {
                let raw = match val {
                    Value::Integer(i) => i64::try_from(i128::from(i))
                        .map_err(|_| Error::Cose("algorithm out of range".to_string()))?,
                    _ => return Err(Error::Cose("algorithm must be an integer".to_string())),
                };
                alg = Some(raw);
            }
            Value::Integer(n) if i128::from(n) == i128::from(HEADER_X5CHAIN) => {
                chain = Some(decode_x5chain(val)?);
            }
            Value::Text(t) if t == HEADER_SIGNING_TIME => {
                let secs = match val {
                    Value::Integer(i) => i64::try_from(i128::from(i))
                        .map_err(|_| Error::Cose("signing time out of range".to_string()))?,
                    _ => return Err(Error::Cose("signing time must be an integer".to_string())),
                };
                signing_time = Utc.timestamp_opt(secs, 0).single();
                if signing_time.is_none() {
                    return Err(Error::Cose(format!("invalid signing time {secs}")));
                }
            }
            _ => {
                // Unknown protected headers are tolerated; they are
                // covered by the signature either way.
            }
        }
    }

    let alg = alg.ok_or_else(|| Error::Cose("missing algorithm header".to_string()))?;
    let scheme = SigningScheme::from_cose_alg(alg)?;
    let cert_chain =
        chain.ok_or_else(|| Error::Cose("missing x5chain header".to_string()))?;
    if cert_chain.is_empty() {
        return Err(Error::Cose("x5chain is empty".to_string()));
    }

    Ok((scheme, cert_chain, signing_time))
}

fn decode_x5chain(value: Value) -> Result<Vec<Vec<u8>>> {
    match value {
        // A single certificate may be a bare byte string.
        Value::Bytes(b) => Ok(vec![b]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Bytes(b) => Ok(b),
                _ => Err(Error::Cose("x5chain entries must be byte strings".to_string())),
            })
            .collect(),
        _ => Err(Error::Cose("x5chain must be a byte string or array".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::Ed25519Signer;

    fn test_signer() -> Ed25519Signer {
        let key = ed25519_dalek::SigningKey::from_bytes(&[5u8; 32]);
        let spki_der = {
            use ed25519_dalek::pkcs8::EncodePrivateKey;
            key.to_pkcs8_der().unwrap()
        };
        let rc_key = rcgen::KeyPair::try_from(spki_der.as_bytes()).unwrap();
        let mut params = rcgen::CertificateParams::new(Vec::new()).unwrap();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "cose test");
        let cert = params.self_signed(&rc_key).unwrap();
        Ed25519Signer::new(key, vec![cert.der().to_vec()])
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let signer = test_signer();
        let payload = b"exact claim bytes";

        let cose = CoseSign1::sign(payload, &signer).unwrap();
        cose.verify(payload).unwrap();

        let bytes = cose.to_bytes().unwrap();
        let decoded = CoseSign1::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.scheme, SigningScheme::Ed25519);
        decoded.verify(payload).unwrap();
    }

    #[test]
    fn test_tampered_payload_fails() {
        let signer = test_signer();
        let cose = CoseSign1::sign(b"original", &signer).unwrap();
        assert!(matches!(
            cose.verify(b"tampered"),
            Err(Error::SignatureMismatch)
        ));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let signer = test_signer();
        let mut cose = CoseSign1::sign(b"payload", &signer).unwrap();
        cose.signature[0] ^= 0x01;
        assert!(cose.verify(b"payload").is_err());
    }

    #[test]
    fn test_signing_time_survives_round_trip() {
        let time = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let key = ed25519_dalek::SigningKey::from_bytes(&[5u8; 32]);
        let signer = {
            let base = test_signer();
            let certs = base.cert_chain().unwrap();
            Ed25519Signer::new(key, certs).with_signing_time(time)
        };

        let cose = CoseSign1::sign(b"payload", &signer).unwrap();
        let decoded = CoseSign1::from_bytes(&cose.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.signing_time, Some(time));
    }

    #[test]
    fn test_attached_payload_rejected() {
        let structure = Value::Array(vec![
            Value::Bytes(vec![0xa0]),
            Value::Map(Vec::new()),
            Value::Bytes(b"attached".to_vec()),
            Value::Bytes(vec![0u8; 64]),
        ]);
        let mut bytes = Vec::new();
        ciborium::into_writer(&structure, &mut bytes).unwrap();
        assert!(CoseSign1::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_unsupported_algorithm_reported() {
        let mut protected = Vec::new();
        ciborium::into_writer(
            &Value::Map(vec![
                (Value::Integer(1i64.into()), Value::Integer((-257i64).into())),
                (
                    Value::Integer(33.into()),
                    Value::Array(vec![Value::Bytes(vec![1, 2, 3])]),
                ),
            ]),
            &mut protected,
        )
        .unwrap();

        let structure = Value::Array(vec![
            Value::Bytes(protected),
            Value::Map(Vec::new()),
            Value::Null,
            Value::Bytes(vec![0u8; 64]),
        ]);
        let mut bytes = Vec::new();
        ciborium::into_writer(&structure, &mut bytes).unwrap();

        assert!(matches!(
            CoseSign1::from_bytes(&bytes),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
