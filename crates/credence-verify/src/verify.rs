//! The verification entry point
//!
//! Orchestrates the pipeline over a decoded store: claim integrity,
//! signature and trust, hash bindings against the live asset bytes, and
//! the ingredient graph. Verification is synchronous and side-effect
//! free: it borrows the asset, container and trust config immutably and
//! owns the report it returns, so parallel calls need no coordination.

use crate::error::Result;
use crate::options::VerifyOptions;
use crate::report::{
    CheckKind, ManifestReport, Severity, TrustVerdict, ValidationCode, ValidationReport,
};
use crate::verify_impl::{claim_checks, hard_binding, ingredient, signature};
use credence_claim::ManifestStore;
use credence_trust::TrustConfig;
use std::collections::{BTreeMap, BTreeSet};

/// Verify a manifest store against the asset it describes.
///
/// Returns `Err` only when the container itself is malformed; every
/// other failure is recorded in the report, scoped to the assertion,
/// manifest or ingredient branch it belongs to.
pub fn verify(
    asset: &[u8],
    container: &[u8],
    trust: &TrustConfig,
) -> Result<ValidationReport> {
    verify_with_options(asset, container, trust, &VerifyOptions::default())
}

/// Verify with explicit policy options
pub fn verify_with_options(
    asset: &[u8],
    container: &[u8],
    trust: &TrustConfig,
    options: &VerifyOptions,
) -> Result<ValidationReport> {
    let store = ManifestStore::from_container(container)?;
    let active = store.active_manifest();

    let mut active_report = ManifestReport::default();
    let mut reached = BTreeSet::new();
    reached.insert(active.label.clone());

    let claim_intact = claim_checks::check_assertion_integrity(active, &mut active_report);
    let trusted = claim_intact
        && signature::verify_manifest_signature(active, trust, &mut active_report);

    if trusted {
        hard_binding::check_hard_bindings(active, asset, options, &mut active_report);
        hard_binding::check_soft_bindings(active, asset, options, &mut active_report);
    } else {
        // A manifest whose claim or signature failed gets no binding
        // verdict; the report says so instead of staying silent.
        active_report.record(
            CheckKind::HardBinding,
            ValidationCode::HardBindingSkipped,
            Severity::Informational,
            None,
        );
    }

    // Ingredient branches are independent of the active manifest's own
    // trust status and are always walked.
    let mut path = vec![active.label.clone()];
    ingredient::check_ingredients(
        &store,
        active,
        trust,
        options,
        &mut path,
        &mut reached,
        &mut active_report,
    );

    let verdict = compute_verdict(&active_report);

    // Manifests never reached from the active one still get evaluated;
    // their results inform diagnostics but not the verdict.
    let mut manifests = BTreeMap::new();
    for manifest in store.manifests() {
        if reached.contains(&manifest.label) {
            continue;
        }
        let mut sibling_report = ManifestReport::default();
        let intact = claim_checks::check_assertion_integrity(manifest, &mut sibling_report);
        if intact {
            signature::verify_manifest_signature(manifest, trust, &mut sibling_report);
        }
        manifests.insert(manifest.label.clone(), sibling_report);
    }

    let active_label = active.label.clone();
    manifests.insert(active_label.clone(), active_report);

    Ok(ValidationReport {
        verdict,
        active_manifest: active_label,
        manifests,
    })
}

fn compute_verdict(active: &ManifestReport) -> TrustVerdict {
    if active.has_failures() {
        TrustVerdict::NotTrusted
    } else if active.has_warnings() || active.has_degraded_ingredients() {
        TrustVerdict::Indeterminate
    } else {
        TrustVerdict::Trusted
    }
}
