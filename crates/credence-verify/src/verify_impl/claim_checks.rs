//! Claim and assertion integrity checks
//!
//! Every assertion reference in the claim must resolve to a stored
//! assertion whose bytes still hash to the declared digest. A mismatch
//! means the assertion was altered after the claim was signed, which is
//! reported distinctly from generic decode failure.

use crate::report::{CheckKind, ManifestReport, Severity, ValidationCode};
use credence_claim::{Assertion, Manifest};
use credence_types::hash_bytes;

/// Check every assertion reference in the manifest's claim.
///
/// Returns true when all references resolved and matched.
pub(crate) fn check_assertion_integrity(manifest: &Manifest, report: &mut ManifestReport) -> bool {
    let mut all_ok = true;

    for reference in &manifest.claim.assertions {
        let label = match reference.url.rsplit('/').next() {
            Some(label) if !label.is_empty() => label,
            _ => {
                report.record(
                    CheckKind::ClaimIntegrity,
                    ValidationCode::AssertionMissing,
                    Severity::Failure,
                    Some(format!("unparseable reference {}", reference.url)),
                );
                all_ok = false;
                continue;
            }
        };

        let Some(stored) = manifest.get_assertion(label) else {
            report.record(
                CheckKind::ClaimIntegrity,
                ValidationCode::AssertionMissing,
                Severity::Failure,
                Some(label.to_string()),
            );
            all_ok = false;
            continue;
        };

        let alg = manifest.claim.ref_alg(reference);
        let computed = hash_bytes(alg, &stored.data);
        if computed == reference.hash {
            report.record(
                CheckKind::ClaimIntegrity,
                ValidationCode::AssertionHashMatch,
                Severity::Pass,
                Some(label.to_string()),
            );
        } else {
            tracing::warn!(label, "assertion bytes do not match claim digest");
            report.record(
                CheckKind::ClaimIntegrity,
                ValidationCode::AssertionTampered,
                Severity::Failure,
                Some(label.to_string()),
            );
            all_ok = false;
        }
    }

    // Unknown assertion kinds are reported but never validated.
    for stored in &manifest.assertions {
        if let Assertion::Unrecognized { label, .. } = &stored.assertion {
            report.record(
                CheckKind::ClaimIntegrity,
                ValidationCode::AssertionUnrecognized,
                Severity::Informational,
                Some(label.clone()),
            );
        }
    }

    all_ok
}
