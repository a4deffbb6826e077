//! Revocation policy and the revocation-check capability
//!
//! Revocation status usually lives behind a remote service (OCSP, CRL
//! distribution points). That lookup is the one operation in the engine
//! allowed to block, so it is modeled as a capability the caller
//! injects; the engine only interprets the answer under the configured
//! policy.

use std::collections::HashSet;
use std::time::Duration;

/// How revocation answers (and non-answers) are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevocationPolicy {
    /// Every certificate in the chain needs a positive non-revoked
    /// answer; inability to check is itself a failure
    Strict,
    /// Revoked certificates fail; inability to check is a recorded
    /// warning
    BestEffort,
    /// No revocation checking
    #[default]
    Disabled,
}

/// Outcome of one revocation lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationStatus {
    /// Positive non-revoked answer
    Good,
    /// The certificate has been revoked
    Revoked { reason: Option<String> },
    /// No answer could be obtained (no source, timeout, service error)
    Unknown { reason: String },
}

/// Caller-injected revocation lookup.
///
/// `timeout` is the caller-configured budget for any remote call the
/// implementation makes; an implementation that cannot answer within it
/// returns [`RevocationStatus::Unknown`] rather than blocking further.
pub trait RevocationChecker: Send + Sync {
    fn check(
        &self,
        cert_der: &[u8],
        issuer_der: Option<&[u8]>,
        timeout: Duration,
    ) -> RevocationStatus;
}

/// The default checker: no revocation source configured
#[derive(Debug, Default)]
pub struct NoRevocationChecker;

impl RevocationChecker for NoRevocationChecker {
    fn check(&self, _cert: &[u8], _issuer: Option<&[u8]>, _timeout: Duration) -> RevocationStatus {
        RevocationStatus::Unknown {
            reason: "no revocation source configured".to_string(),
        }
    }
}

/// A fixed revocation list keyed by certificate DER bytes.
///
/// Answers `Revoked` for listed certificates and `Good` for everything
/// else, so it doubles as a deterministic checker for tests and for
/// deployments with a pre-distributed CRL snapshot.
#[derive(Debug, Default)]
pub struct StaticRevocationList {
    revoked: HashSet<Vec<u8>>,
}

impl StaticRevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(mut self, cert_der: Vec<u8>) -> Self {
        self.revoked.insert(cert_der);
        self
    }
}

impl RevocationChecker for StaticRevocationList {
    fn check(&self, cert_der: &[u8], _issuer: Option<&[u8]>, _timeout: Duration) -> RevocationStatus {
        if self.revoked.contains(cert_der) {
            RevocationStatus::Revoked { reason: None }
        } else {
            RevocationStatus::Good
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_checker_is_unknown() {
        let status = NoRevocationChecker.check(b"cert", None, Duration::from_secs(1));
        assert!(matches!(status, RevocationStatus::Unknown { .. }));
    }

    #[test]
    fn test_static_list() {
        let list = StaticRevocationList::new().revoke(b"bad".to_vec());
        assert_eq!(
            list.check(b"bad", None, Duration::from_secs(1)),
            RevocationStatus::Revoked { reason: None }
        );
        assert_eq!(
            list.check(b"good", None, Duration::from_secs(1)),
            RevocationStatus::Good
        );
    }
}
