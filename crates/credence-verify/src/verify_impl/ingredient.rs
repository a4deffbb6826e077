//! Ingredient graph construction
//!
//! Ingredient manifests live flat in the decoded store and are resolved
//! by label, so the provenance graph is built over the store as an
//! arena: nodes are manifests, edges are ingredient references. Cycle
//! detection uses a path-local visited set — two branches sharing an
//! ancestor is legitimate, re-entering a manifest on the same path is
//! not. Either violation fails only the offending branch.

use crate::options::VerifyOptions;
use crate::report::{CheckKind, ManifestReport, Severity, ValidationCode};
use crate::verify_impl::{claim_checks, signature};
use credence_claim::{Manifest, ManifestStore};
use credence_trust::TrustConfig;
use credence_types::manifest_label_from_uri;
use std::collections::BTreeSet;

/// Walk a manifest's ingredient references, verifying each referenced
/// manifest and recursing into its own ingredients.
///
/// `path` holds the labels of every manifest on the current branch;
/// `reached` collects every label the walk arrived at (including those
/// cut off at the depth limit), so the caller can tell which store
/// manifests were never reachable from the active one.
pub(crate) fn check_ingredients(
    store: &ManifestStore,
    manifest: &Manifest,
    trust: &TrustConfig,
    options: &VerifyOptions,
    path: &mut Vec<String>,
    reached: &mut BTreeSet<String>,
    report: &mut ManifestReport,
) {
    for (stored, ingredient) in manifest.ingredient_assertions() {
        let Some(reference) = &ingredient.manifest else {
            // Ingredients without credentials carry no manifest to follow.
            continue;
        };

        let label = match manifest_label_from_uri(&reference.url) {
            Ok(label) => label,
            Err(e) => {
                report.record(
                    CheckKind::Ingredient,
                    ValidationCode::IngredientMissing,
                    Severity::Failure,
                    Some(format!("{}: {e}", stored.label)),
                );
                continue;
            }
        };

        // A label already on this branch's path is a cycle; fail the
        // branch without following the edge.
        if path.iter().any(|p| p == &label) {
            tracing::warn!(label = %label, "ingredient cycle detected");
            report.record(
                CheckKind::Ingredient,
                ValidationCode::IngredientCycle,
                Severity::Failure,
                Some(label),
            );
            continue;
        }

        // Depth is enforced per path; the boundary manifest itself
        // carries the failure. It still counts as reached so it is not
        // re-reported as an unreferenced sibling.
        if path.len() >= options.max_ingredient_depth {
            reached.insert(label.clone());
            let mut nested = ManifestReport::default();
            nested.record(
                CheckKind::Ingredient,
                ValidationCode::IngredientDepthExceeded,
                Severity::Failure,
                Some(label.clone()),
            );
            report.ingredients.insert(label, nested);
            continue;
        }

        let Some(ingredient_manifest) = store.get(&label) else {
            report.record(
                CheckKind::Ingredient,
                ValidationCode::IngredientMissing,
                Severity::Failure,
                Some(label),
            );
            continue;
        };
        reached.insert(label.clone());

        // The declared digest binds the reference to the ingredient's
        // stored manifest box, byte for byte.
        let alg = reference.alg.unwrap_or(manifest.claim.alg);
        if ingredient_manifest.box_digest(alg) != reference.hash {
            report.record(
                CheckKind::Ingredient,
                ValidationCode::IngredientHashMismatch,
                Severity::Failure,
                Some(label),
            );
            continue;
        }

        // Verify the ingredient manifest itself, then recurse. Its hard
        // bindings describe the ingredient's own asset, which is not
        // present here; the box digest above is the binding instead.
        let mut nested = ManifestReport::default();
        let intact = claim_checks::check_assertion_integrity(ingredient_manifest, &mut nested);
        if intact {
            signature::verify_manifest_signature(ingredient_manifest, trust, &mut nested);
        }

        path.push(label.clone());
        check_ingredients(
            store,
            ingredient_manifest,
            trust,
            options,
            path,
            reached,
            &mut nested,
        );
        path.pop();

        if !nested.has_failures() && !nested.has_degraded_ingredients() {
            report.record(
                CheckKind::Ingredient,
                ValidationCode::IngredientValidated,
                Severity::Pass,
                Some(label.clone()),
            );
        }
        report.ingredients.insert(label, nested);
    }
}
