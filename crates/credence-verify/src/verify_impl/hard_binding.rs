//! Hash binding validation
//!
//! Hard bindings recompute the declared digest over the asset with the
//! assertion's exclusion zones skipped and require exact equality. A
//! mismatch means the asset's bytes changed since the claim was made —
//! a distinct, user-facing outcome from signature failure. Soft
//! bindings are evaluated under their own algorithm's tolerance and
//! recorded as confidence-bounded results.

use crate::options::{MissingHardBinding, VerifyOptions};
use crate::report::{CheckKind, ManifestReport, Severity, ValidationCode};
use credence_claim::Manifest;
use credence_types::hash_with_exclusions;

/// Validate every hard binding in the manifest against the asset bytes
pub(crate) fn check_hard_bindings(
    manifest: &Manifest,
    asset: &[u8],
    options: &VerifyOptions,
    report: &mut ManifestReport,
) {
    let mut found = false;

    for (stored, data_hash) in manifest.data_hash_assertions() {
        found = true;

        let computed =
            match hash_with_exclusions(data_hash.alg, asset, &data_hash.exclusions) {
                Ok(digest) => digest,
                Err(e) => {
                    report.record(
                        CheckKind::HardBinding,
                        ValidationCode::DataHashMismatch,
                        Severity::Failure,
                        Some(format!("{}: {e}", stored.label)),
                    );
                    continue;
                }
            };

        if computed == data_hash.hash {
            report.record(
                CheckKind::HardBinding,
                ValidationCode::DataHashMatch,
                Severity::Pass,
                Some(stored.label.clone()),
            );
        } else {
            tracing::warn!(label = %stored.label, "asset bytes do not match hard binding");
            report.record(
                CheckKind::HardBinding,
                ValidationCode::DataHashMismatch,
                Severity::Failure,
                Some(stored.label.clone()),
            );
        }
    }

    if !found {
        let severity = match options.missing_hard_binding {
            MissingHardBinding::ReportOnly => Severity::Informational,
            MissingHardBinding::Fail => Severity::Failure,
        };
        report.record(
            CheckKind::HardBinding,
            ValidationCode::DataHashMissing,
            severity,
            None,
        );
    }
}

/// Evaluate every soft binding in the manifest against the asset bytes
pub(crate) fn check_soft_bindings(
    manifest: &Manifest,
    asset: &[u8],
    options: &VerifyOptions,
    report: &mut ManifestReport,
) {
    for (stored, binding) in manifest.soft_binding_assertions() {
        match options.soft_bindings.get(&binding.alg) {
            Some(algorithm) => {
                let actual = algorithm.fingerprint(asset);
                let result = algorithm.compare(&binding.value, &actual);
                report.record(
                    CheckKind::SoftBinding,
                    ValidationCode::SoftBindingEvaluated,
                    Severity::Informational,
                    Some(format!(
                        "{}: score={:.4} likely_match={}",
                        binding.alg, result.score, result.likely_match
                    )),
                );
            }
            None => {
                tracing::debug!(alg = %binding.alg, "no soft-binding algorithm registered");
                report.record(
                    CheckKind::SoftBinding,
                    ValidationCode::SoftBindingUnknownAlgorithm,
                    Severity::Informational,
                    Some(format!("{}: {}", stored.label, binding.alg)),
                );
            }
        }
    }
}
