//! X.509 parsing and chain-link primitives
//!
//! Certificates are verified over their original DER bytes. Re-encoding
//! a parsed TBSCertificate can produce different bytes for semantically
//! equal input, which breaks signature checks, so the TBS region is
//! sliced out of the original encoding instead.

use crate::error::{Error, Result};
use crate::scheme::SigningScheme;
use crate::verify::VerifyingKey;
use chrono::{DateTime, Utc};
use const_oid::db::rfc5912::{ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384};
use const_oid::db::rfc8410::ID_ED_25519;
use x509_cert::der::{Decode, Encode, Header, Reader, SliceReader};
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::Certificate;

/// Parsed facts about one certificate
#[derive(Debug, Clone)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub serial: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub spki: SubjectPublicKeyInfoOwned,
}

impl CertificateInfo {
    /// Whether subject and issuer name match (a root candidate)
    pub fn is_self_issued(&self) -> bool {
        self.subject == self.issuer
    }
}

/// Parse the fields the trust verifier needs from a DER certificate
pub fn parse_certificate_info(cert_der: &[u8]) -> Result<CertificateInfo> {
    let cert = Certificate::from_der(cert_der)
        .map_err(|e| Error::Certificate(format!("failed to parse certificate: {e}")))?;

    let tbs = &cert.tbs_certificate;

    let not_before = DateTime::<Utc>::from(tbs.validity.not_before.to_system_time());
    let not_after = DateTime::<Utc>::from(tbs.validity.not_after.to_system_time());

    Ok(CertificateInfo {
        subject: tbs.subject.to_string(),
        issuer: tbs.issuer.to_string(),
        serial: hex::encode(tbs.serial_number.as_bytes()),
        not_before,
        not_after,
        spki: tbs.subject_public_key_info.clone(),
    })
}

/// Verify that `cert_der` was signed by the key in `issuer_der`.
///
/// Checks the issuer/subject name linkage, that the certificate's
/// signature algorithm matches the issuer's key type, and the signature
/// itself over the original TBS bytes.
pub fn verify_issued_by(cert_der: &[u8], issuer_der: &[u8]) -> Result<()> {
    let cert = Certificate::from_der(cert_der)
        .map_err(|e| Error::Certificate(format!("failed to parse certificate: {e}")))?;
    let issuer = Certificate::from_der(issuer_der)
        .map_err(|e| Error::Certificate(format!("failed to parse issuer: {e}")))?;

    if cert.tbs_certificate.issuer != issuer.tbs_certificate.subject {
        return Err(Error::Certificate(
            "certificate issuer does not match issuer subject".to_string(),
        ));
    }

    let sig_alg = cert.signature_algorithm.oid;
    let expected_scheme = if sig_alg == ECDSA_WITH_SHA_256 {
        SigningScheme::EcdsaP256Sha256
    } else if sig_alg == ECDSA_WITH_SHA_384 {
        SigningScheme::EcdsaP384Sha384
    } else if sig_alg == ID_ED_25519 {
        SigningScheme::Ed25519
    } else {
        return Err(Error::UnsupportedAlgorithm(format!(
            "certificate signature algorithm {sig_alg}"
        )));
    };

    let issuer_key = VerifyingKey::from_spki(&issuer.tbs_certificate.subject_public_key_info)?;
    if issuer_key.scheme() != expected_scheme {
        return Err(Error::KeyMismatch(format!(
            "certificate signed with {expected_scheme:?} but issuer key is {:?}",
            issuer_key.scheme()
        )));
    }

    let signature = cert
        .signature
        .as_bytes()
        .ok_or_else(|| Error::Certificate("certificate signature has unused bits".to_string()))?;

    let tbs_der = extract_tbs_der(cert_der)?;
    issuer_key.verify_der(&tbs_der, signature)
}

/// Slice the original TBSCertificate DER bytes out of a certificate.
///
/// A Certificate is `SEQUENCE { tbsCertificate, signatureAlgorithm,
/// signatureValue }`; the TBS element (header included) is the signed
/// region.
pub fn extract_tbs_der(cert_der: &[u8]) -> Result<Vec<u8>> {
    let mut reader = SliceReader::new(cert_der)
        .map_err(|e| Error::Certificate(format!("DER reader: {e}")))?;

    let outer = Header::decode(&mut reader)
        .map_err(|e| Error::Certificate(format!("certificate header: {e}")))?;
    let contents = reader
        .read_slice(outer.length)
        .map_err(|e| Error::Certificate(format!("certificate contents: {e}")))?;

    let mut tbs_reader = SliceReader::new(contents)
        .map_err(|e| Error::Certificate(format!("TBS reader: {e}")))?;
    let tbs_header = Header::decode(&mut tbs_reader)
        .map_err(|e| Error::Certificate(format!("TBS header: {e}")))?;

    let header_len: usize = tbs_header
        .encoded_len()
        .map_err(|e| Error::Certificate(format!("TBS header length: {e}")))?
        .try_into()
        .map_err(|_| Error::Certificate("TBS header length overflow".to_string()))?;
    let body_len: usize = tbs_header
        .length
        .try_into()
        .map_err(|_| Error::Certificate("TBS body length overflow".to_string()))?;

    let total = header_len
        .checked_add(body_len)
        .filter(|&t| t <= contents.len())
        .ok_or_else(|| Error::Certificate("TBS length exceeds certificate".to_string()))?;

    Ok(contents[..total].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ca_and_leaf() -> (Vec<u8>, Vec<u8>) {
        let ca_key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519).unwrap();
        let mut ca_params = rcgen::CertificateParams::new(Vec::new()).unwrap();
        ca_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        ca_params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "test root");
        let ca_cert = ca_params.self_signed(&ca_key).unwrap();

        let leaf_key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519).unwrap();
        let mut leaf_params = rcgen::CertificateParams::new(Vec::new()).unwrap();
        leaf_params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "test leaf");
        let leaf_cert = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key).unwrap();

        (leaf_cert.der().to_vec(), ca_cert.der().to_vec())
    }

    #[test]
    fn test_parse_certificate_info() {
        let (leaf, ca) = ca_and_leaf();
        let info = parse_certificate_info(&leaf).unwrap();
        assert!(info.subject.contains("test leaf"));
        assert!(info.issuer.contains("test root"));
        assert!(!info.is_self_issued());
        assert!(info.not_before < info.not_after);

        let ca_info = parse_certificate_info(&ca).unwrap();
        assert!(ca_info.is_self_issued());
    }

    #[test]
    fn test_verify_issued_by() {
        let (leaf, ca) = ca_and_leaf();
        verify_issued_by(&leaf, &ca).unwrap();
        // A root signs itself.
        verify_issued_by(&ca, &ca).unwrap();
        // The leaf did not sign the root.
        assert!(verify_issued_by(&ca, &leaf).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let (leaf, _ca) = ca_and_leaf();
        let (_other_leaf, other_ca) = ca_and_leaf();
        assert!(verify_issued_by(&leaf, &other_ca).is_err());
    }

    #[test]
    fn test_garbage_certificate_rejected() {
        assert!(parse_certificate_info(b"not a certificate").is_err());
        assert!(extract_tbs_der(b"\x30\x03\x02\x01\x01").is_err());
    }
}
