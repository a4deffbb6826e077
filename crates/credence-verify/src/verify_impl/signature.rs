//! Signature and trust-chain verification
//!
//! The steps run in a fixed order, each short-circuiting the rest on
//! failure: parse the COSE structure and its chain, check validity
//! windows, link the chain to a configured anchor, evaluate revocation
//! under the configured policy, and finally verify the signature bytes
//! over the exact claim bytes.

use crate::report::{CheckKind, ManifestReport, Severity, ValidationCode};
use chrono::{DateTime, Utc};
use credence_claim::Manifest;
use credence_crypto::{parse_certificate_info, verify_issued_by, CoseSign1};
use credence_trust::{RevocationPolicy, RevocationStatus, SigningTimePolicy, TrustConfig};

/// Verify the manifest's signature and its chain of trust.
///
/// Returns true when the manifest's trust status is intact; hash
/// bindings are only worth checking in that case.
pub(crate) fn verify_manifest_signature(
    manifest: &Manifest,
    trust: &TrustConfig,
    report: &mut ManifestReport,
) -> bool {
    // Step 1: parse the signature structure and its certificate chain.
    let cose = match CoseSign1::from_bytes(&manifest.signature_bytes) {
        Ok(cose) => cose,
        Err(credence_crypto::Error::UnsupportedAlgorithm(detail)) => {
            report.record(
                CheckKind::Signature,
                ValidationCode::UnsupportedAlgorithm,
                Severity::Failure,
                Some(detail),
            );
            return false;
        }
        Err(e) => {
            report.record(
                CheckKind::Signature,
                ValidationCode::SignatureMalformed,
                Severity::Failure,
                Some(e.to_string()),
            );
            return false;
        }
    };

    let chain: Vec<CertInfo> = match parse_chain(&cose) {
        Ok(chain) => chain,
        Err(detail) => {
            report.record(
                CheckKind::Signature,
                ValidationCode::SignatureMalformed,
                Severity::Failure,
                Some(detail),
            );
            return false;
        }
    };

    // Step 2: validity windows, against the signing-time attestation
    // when present, else the verification clock with skew tolerance.
    if !check_validity_windows(&chain, cose.signing_time, trust, report) {
        return false;
    }

    // Step 3: chain linkage to a configured anchor.
    if !check_chain_to_anchor(&chain, trust, report) {
        return false;
    }

    // Step 4: revocation under the configured policy.
    if !check_revocation(&chain, trust, report) {
        return false;
    }

    // Step 5: the signature itself, over the exact stored claim bytes.
    match cose.verify(&manifest.claim_bytes) {
        Ok(()) => {
            report.record(
                CheckKind::Signature,
                ValidationCode::ClaimSignatureValidated,
                Severity::Pass,
                None,
            );
            report.record(
                CheckKind::TrustChain,
                ValidationCode::SigningCredentialTrusted,
                Severity::Pass,
                chain.first().map(|c| c.info.subject.clone()),
            );
            true
        }
        Err(credence_crypto::Error::KeyMismatch(detail))
        | Err(credence_crypto::Error::UnsupportedAlgorithm(detail)) => {
            report.record(
                CheckKind::Signature,
                ValidationCode::UnsupportedAlgorithm,
                Severity::Failure,
                Some(detail),
            );
            false
        }
        Err(e) => {
            report.record(
                CheckKind::Signature,
                ValidationCode::SignatureMismatch,
                Severity::Failure,
                Some(e.to_string()),
            );
            false
        }
    }
}

struct CertInfo {
    der: Vec<u8>,
    info: credence_crypto::CertificateInfo,
}

fn parse_chain(cose: &CoseSign1) -> Result<Vec<CertInfo>, String> {
    cose.cert_chain
        .iter()
        .map(|der| {
            parse_certificate_info(der)
                .map(|info| CertInfo {
                    der: der.clone(),
                    info,
                })
                .map_err(|e| e.to_string())
        })
        .collect()
}

fn check_validity_windows(
    chain: &[CertInfo],
    signing_time: Option<DateTime<Utc>>,
    trust: &TrustConfig,
    report: &mut ManifestReport,
) -> bool {
    // The attestation lives in the signed protected header, but it is
    // asserted by the very key whose validity window is being checked.
    // It only counts when the caller's policy says signer-asserted
    // times are trusted; otherwise the verification clock with skew
    // tolerance applies.
    let (time, skew) = match (trust.signing_time_policy(), signing_time) {
        (SigningTimePolicy::TrustSignerAsserted, Some(attested)) => {
            (attested, chrono::Duration::zero())
        }
        _ => (
            Utc::now(),
            chrono::Duration::seconds(trust.clock_skew_seconds()),
        ),
    };

    for cert in chain {
        if time + skew < cert.info.not_before {
            report.record(
                CheckKind::TrustChain,
                ValidationCode::CredentialNotYetValid,
                Severity::Failure,
                Some(cert.info.subject.clone()),
            );
            return false;
        }
        if time - skew > cert.info.not_after {
            report.record(
                CheckKind::TrustChain,
                ValidationCode::CredentialExpired,
                Severity::Failure,
                Some(cert.info.subject.clone()),
            );
            return false;
        }
    }
    true
}

fn check_chain_to_anchor(
    chain: &[CertInfo],
    trust: &TrustConfig,
    report: &mut ManifestReport,
) -> bool {
    let fail = |detail: String, report: &mut ManifestReport| {
        report.record(
            CheckKind::TrustChain,
            ValidationCode::CredentialUntrusted,
            Severity::Failure,
            Some(detail),
        );
        false
    };

    if !trust.has_anchors() {
        return fail("no trust anchors configured".to_string(), report);
    }

    // Every adjacent pair must link cryptographically.
    for pair in chain.windows(2) {
        if let Err(e) = verify_issued_by(&pair[0].der, &pair[1].der) {
            return fail(
                format!("broken chain link below {}: {e}", pair[1].info.subject),
                report,
            );
        }
    }

    // Intermediates (everything between leaf and the chain's last
    // certificate) must appear in the allow-list when one is set.
    if chain.len() > 2 {
        for cert in &chain[1..chain.len() - 1] {
            if !trust.intermediate_allowed(&cert.der) {
                return fail(
                    format!("intermediate not in allow-list: {}", cert.info.subject),
                    report,
                );
            }
        }
    }

    // The chain's top must be an anchor itself or be issued by one.
    let top = match chain.last() {
        Some(top) => top,
        None => return fail("empty certificate chain".to_string(), report),
    };

    if trust.is_anchor(&top.der) {
        return true;
    }
    for anchor in trust.anchors() {
        if verify_issued_by(&top.der, anchor.as_ref()).is_ok() {
            return true;
        }
    }

    tracing::debug!(subject = %top.info.subject, "chain does not reach a trust anchor");
    fail(
        format!("no path from {} to a trust anchor", top.info.subject),
        report,
    )
}

fn check_revocation(chain: &[CertInfo], trust: &TrustConfig, report: &mut ManifestReport) -> bool {
    let policy = trust.revocation_policy();
    if policy == RevocationPolicy::Disabled {
        return true;
    }

    let checker = trust.revocation_checker();
    let timeout = trust.revocation_timeout();
    let mut all_good = true;

    for (i, cert) in chain.iter().enumerate() {
        let issuer = chain.get(i + 1).map(|c| c.der.as_slice());
        match checker.check(&cert.der, issuer, timeout) {
            RevocationStatus::Good => {}
            RevocationStatus::Revoked { reason } => {
                report.record(
                    CheckKind::Revocation,
                    ValidationCode::CredentialRevoked,
                    Severity::Failure,
                    Some(match reason {
                        Some(reason) => format!("{}: {reason}", cert.info.subject),
                        None => cert.info.subject.clone(),
                    }),
                );
                return false;
            }
            RevocationStatus::Unknown { reason } => {
                let severity = match policy {
                    RevocationPolicy::Strict => Severity::Failure,
                    RevocationPolicy::BestEffort => Severity::Warning,
                    RevocationPolicy::Disabled => unreachable!(),
                };
                report.record(
                    CheckKind::Revocation,
                    ValidationCode::RevocationUnknown,
                    severity,
                    Some(format!("{}: {reason}", cert.info.subject)),
                );
                if policy == RevocationPolicy::Strict {
                    return false;
                }
                all_good = false;
            }
        }
    }

    if all_good {
        report.record(
            CheckKind::Revocation,
            ValidationCode::RevocationChecked,
            Severity::Pass,
            None,
        );
    }
    true
}
