//! The trust configuration

use crate::error::{Error, Result};
use crate::revocation::{NoRevocationChecker, RevocationChecker, RevocationPolicy};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::CertificateDer;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default tolerance for clock disagreement when no signing-time
/// attestation is present
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Default budget for one revocation lookup
const DEFAULT_REVOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// How the signing-time attestation embedded in a signature is treated
/// when checking certificate validity windows.
///
/// The attestation sits in the signed protected header, but it is
/// asserted by the same key it would vouch for: an expired key can sign
/// a time inside its own validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningTimePolicy {
    /// Ignore signer-asserted times; validity windows are checked
    /// against the verification clock with skew tolerance
    #[default]
    Untrusted,
    /// Honor the signer-asserted time when present. Opt-in for
    /// deployments whose signatures carry a timestamp trusted through
    /// an independent channel (e.g. a timestamping countersignature
    /// the caller verifies before configuring this)
    TrustSignerAsserted,
}

/// Caller-supplied trust configuration for a verification call.
///
/// Construction is builder-style; once handed to `verify` the config is
/// only read.
#[derive(Clone)]
pub struct TrustConfig {
    anchors: Vec<CertificateDer<'static>>,
    intermediates: Option<Vec<CertificateDer<'static>>>,
    revocation: RevocationPolicy,
    revocation_checker: Arc<dyn RevocationChecker>,
    revocation_timeout: Duration,
    clock_skew_seconds: i64,
    signing_time: SigningTimePolicy,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            anchors: Vec::new(),
            intermediates: None,
            revocation: RevocationPolicy::default(),
            revocation_checker: Arc::new(NoRevocationChecker),
            revocation_timeout: DEFAULT_REVOCATION_TIMEOUT,
            clock_skew_seconds: DEFAULT_CLOCK_SKEW_SECONDS,
            signing_time: SigningTimePolicy::default(),
        }
    }
}

impl fmt::Debug for TrustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustConfig")
            .field("anchors", &self.anchors.len())
            .field(
                "intermediates",
                &self.intermediates.as_ref().map(Vec::len),
            )
            .field("revocation", &self.revocation)
            .field("clock_skew_seconds", &self.clock_skew_seconds)
            .field("signing_time", &self.signing_time)
            .finish_non_exhaustive()
    }
}

impl TrustConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one trusted root certificate (DER)
    pub fn with_anchor(mut self, cert_der: Vec<u8>) -> Self {
        self.anchors.push(CertificateDer::from(cert_der));
        self
    }

    /// Add every certificate found in a PEM bundle as a trusted root
    pub fn with_anchors_pem(mut self, pem: &[u8]) -> Result<Self> {
        let mut added = 0usize;
        for cert in CertificateDer::pem_slice_iter(pem) {
            let cert = cert.map_err(|e| Error::InvalidPem(format!("{e:?}")))?;
            self.anchors.push(cert.into_owned());
            added += 1;
        }
        if added == 0 {
            return Err(Error::InvalidPem("no certificates found".to_string()));
        }
        Ok(self)
    }

    /// Restrict acceptable intermediates to this allow-list (DER).
    ///
    /// Without an allow-list any intermediate that chains correctly is
    /// acceptable.
    pub fn with_intermediate_allow_list(mut self, certs: Vec<Vec<u8>>) -> Self {
        self.intermediates = Some(certs.into_iter().map(CertificateDer::from).collect());
        self
    }

    pub fn with_revocation_policy(mut self, policy: RevocationPolicy) -> Self {
        self.revocation = policy;
        self
    }

    pub fn with_revocation_checker(mut self, checker: Arc<dyn RevocationChecker>) -> Self {
        self.revocation_checker = checker;
        self
    }

    pub fn with_revocation_timeout(mut self, timeout: Duration) -> Self {
        self.revocation_timeout = timeout;
        self
    }

    pub fn with_clock_skew_seconds(mut self, seconds: i64) -> Self {
        self.clock_skew_seconds = seconds;
        self
    }

    pub fn with_signing_time_policy(mut self, policy: SigningTimePolicy) -> Self {
        self.signing_time = policy;
        self
    }

    /// Whether `cert_der` is one of the configured trust anchors
    pub fn is_anchor(&self, cert_der: &[u8]) -> bool {
        self.anchors.iter().any(|a| a.as_ref() == cert_der)
    }

    /// Whether `cert_der` is acceptable as an intermediate
    pub fn intermediate_allowed(&self, cert_der: &[u8]) -> bool {
        match &self.intermediates {
            Some(allowed) => allowed.iter().any(|a| a.as_ref() == cert_der),
            None => true,
        }
    }

    pub fn anchors(&self) -> &[CertificateDer<'static>] {
        &self.anchors
    }

    pub fn has_anchors(&self) -> bool {
        !self.anchors.is_empty()
    }

    pub fn revocation_policy(&self) -> RevocationPolicy {
        self.revocation
    }

    pub fn revocation_checker(&self) -> &dyn RevocationChecker {
        self.revocation_checker.as_ref()
    }

    pub fn revocation_timeout(&self) -> Duration {
        self.revocation_timeout
    }

    pub fn clock_skew_seconds(&self) -> i64 {
        self.clock_skew_seconds
    }

    pub fn signing_time_policy(&self) -> SigningTimePolicy {
        self.signing_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_signed() -> rcgen::Certificate {
        let key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519).unwrap();
        let mut params = rcgen::CertificateParams::new(Vec::new()).unwrap();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, "anchor");
        params.self_signed(&key).unwrap()
    }

    fn self_signed_der() -> Vec<u8> {
        self_signed().der().to_vec()
    }

    #[test]
    fn test_anchor_membership() {
        let der = self_signed_der();
        let config = TrustConfig::new().with_anchor(der.clone());
        assert!(config.is_anchor(&der));
        assert!(!config.is_anchor(b"other"));
        assert!(config.has_anchors());
    }

    #[test]
    fn test_pem_anchors() {
        let cert = self_signed();
        let config = TrustConfig::new()
            .with_anchors_pem(cert.pem().as_bytes())
            .unwrap();
        assert!(config.is_anchor(cert.der().as_ref()));
    }

    #[test]
    fn test_empty_pem_rejected() {
        assert!(TrustConfig::new().with_anchors_pem(b"no certs here").is_err());
    }

    #[test]
    fn test_intermediate_allow_list() {
        let config = TrustConfig::new();
        assert!(config.intermediate_allowed(b"anything"));

        let config = config.with_intermediate_allow_list(vec![b"allowed".to_vec()]);
        assert!(config.intermediate_allowed(b"allowed"));
        assert!(!config.intermediate_allowed(b"other"));
    }
}
