//! The validation report
//!
//! Verification accumulates one [`ManifestReport`] per manifest, with
//! ingredient reports nested under the manifest that references them,
//! plus an overall trust verdict. Reports use ordered maps and carry no
//! wall-clock values, so verifying the same inputs twice produces
//! identical reports.

use serde::Serialize;
use std::collections::BTreeMap;

/// Which stage of the pipeline produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKind {
    /// Claim structure and assertion-reference integrity
    ClaimIntegrity,
    /// COSE signature over the claim bytes
    Signature,
    /// Certificate chain evaluation against the trust configuration
    TrustChain,
    /// Revocation status of the signing chain
    Revocation,
    /// Hard binding between claim and asset bytes
    HardBinding,
    /// Soft (fingerprint) binding
    SoftBinding,
    /// Ingredient reference resolution and recursion
    Ingredient,
}

/// Severity of one recorded outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Pass,
    Informational,
    Warning,
    Failure,
}

/// Specific validation outcomes, in the dotted code style surfaced to
/// callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ValidationCode {
    // success
    AssertionHashMatch,
    ClaimSignatureValidated,
    SigningCredentialTrusted,
    RevocationChecked,
    DataHashMatch,
    IngredientValidated,
    // informational / policy-dependent
    AssertionUnrecognized,
    SoftBindingEvaluated,
    SoftBindingUnknownAlgorithm,
    DataHashMissing,
    RevocationUnknown,
    HardBindingSkipped,
    // failures
    AssertionMissing,
    AssertionTampered,
    SignatureMalformed,
    SignatureMismatch,
    CredentialUntrusted,
    CredentialExpired,
    CredentialNotYetValid,
    CredentialRevoked,
    UnsupportedAlgorithm,
    DataHashMismatch,
    IngredientHashMismatch,
    IngredientMissing,
    IngredientCycle,
    IngredientDepthExceeded,
}

impl ValidationCode {
    /// The dotted string code surfaced in serialized reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::AssertionHashMatch => "assertion.hashedURI.match",
            ValidationCode::ClaimSignatureValidated => "claimSignature.validated",
            ValidationCode::SigningCredentialTrusted => "signingCredential.trusted",
            ValidationCode::RevocationChecked => "signingCredential.notRevoked",
            ValidationCode::DataHashMatch => "assertion.dataHash.match",
            ValidationCode::IngredientValidated => "ingredient.validated",
            ValidationCode::AssertionUnrecognized => "assertion.unrecognized",
            ValidationCode::SoftBindingEvaluated => "assertion.softBinding.evaluated",
            ValidationCode::SoftBindingUnknownAlgorithm => {
                "assertion.softBinding.unknownAlgorithm"
            }
            ValidationCode::DataHashMissing => "claim.dataHash.missing",
            ValidationCode::RevocationUnknown => "signingCredential.revocationUnknown",
            ValidationCode::HardBindingSkipped => "assertion.dataHash.skipped",
            ValidationCode::AssertionMissing => "assertion.missing",
            ValidationCode::AssertionTampered => "assertion.hashedURI.mismatch",
            ValidationCode::SignatureMalformed => "claimSignature.malformed",
            ValidationCode::SignatureMismatch => "claimSignature.mismatch",
            ValidationCode::CredentialUntrusted => "signingCredential.untrusted",
            ValidationCode::CredentialExpired => "signingCredential.expired",
            ValidationCode::CredentialNotYetValid => "signingCredential.notYetValid",
            ValidationCode::CredentialRevoked => "signingCredential.revoked",
            ValidationCode::UnsupportedAlgorithm => "signingCredential.unsupportedAlgorithm",
            ValidationCode::DataHashMismatch => "assertion.dataHash.mismatch",
            ValidationCode::IngredientHashMismatch => "ingredient.hashedURI.mismatch",
            ValidationCode::IngredientMissing => "ingredient.manifestMissing",
            ValidationCode::IngredientCycle => "ingredient.cycleDetected",
            ValidationCode::IngredientDepthExceeded => "ingredient.depthExceeded",
        }
    }
}

impl From<ValidationCode> for String {
    fn from(code: ValidationCode) -> String {
        code.as_str().to_string()
    }
}

/// One recorded check outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRecord {
    pub kind: CheckKind,
    pub code: ValidationCode,
    pub severity: Severity,
    /// What the record refers to (assertion label, certificate subject,
    /// score), when a code alone is ambiguous
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Validation results for one manifest, with nested ingredient reports
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManifestReport {
    pub checks: Vec<CheckRecord>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ingredients: BTreeMap<String, ManifestReport>,
}

impl ManifestReport {
    pub fn record(
        &mut self,
        kind: CheckKind,
        code: ValidationCode,
        severity: Severity,
        detail: Option<String>,
    ) {
        self.checks.push(CheckRecord {
            kind,
            code,
            severity,
            detail,
        });
    }

    /// Whether this manifest's own checks contain a failure
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.severity == Severity::Failure)
    }

    /// Whether this manifest's own checks contain a warning
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.severity == Severity::Warning)
    }

    /// Whether any nested ingredient report (recursively) contains a
    /// failure or warning
    pub fn has_degraded_ingredients(&self) -> bool {
        self.ingredients.values().any(|r| {
            r.has_failures() || r.has_warnings() || r.has_degraded_ingredients()
        })
    }

    /// Find every record with the given code, here and in nested reports
    pub fn find_code(&self, code: ValidationCode) -> Vec<&CheckRecord> {
        let mut found: Vec<&CheckRecord> =
            self.checks.iter().filter(|c| c.code == code).collect();
        for nested in self.ingredients.values() {
            found.extend(nested.find_code(code));
        }
        found
    }
}

/// The single overall answer for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustVerdict {
    /// Signature, trust chain and hard bindings all validated
    Trusted,
    /// The active manifest failed a fatal check
    NotTrusted,
    /// Nothing fatal on the active manifest, but warnings or broken
    /// ingredient branches prevent a positive answer
    Indeterminate,
}

/// The aggregated result of verifying a manifest store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub verdict: TrustVerdict,
    /// Label of the active manifest the verdict applies to
    pub active_manifest: String,
    /// Per-manifest results; ingredient manifests nest under their
    /// referencing manifest rather than appearing here
    pub manifests: BTreeMap<String, ManifestReport>,
}

impl ValidationReport {
    /// The active manifest's report
    pub fn active_report(&self) -> Option<&ManifestReport> {
        self.manifests.get(&self.active_manifest)
    }

    /// Find every record with the given code anywhere in the report
    pub fn find_code(&self, code: ValidationCode) -> Vec<&CheckRecord> {
        self.manifests
            .values()
            .flat_map(|m| m.find_code(code))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings() {
        assert_eq!(
            ValidationCode::AssertionTampered.as_str(),
            "assertion.hashedURI.mismatch"
        );
        assert_eq!(
            ValidationCode::IngredientCycle.as_str(),
            "ingredient.cycleDetected"
        );
    }

    #[test]
    fn test_degraded_ingredient_detection() {
        let mut parent = ManifestReport::default();
        let mut child = ManifestReport::default();
        child.record(
            CheckKind::Signature,
            ValidationCode::SignatureMismatch,
            Severity::Failure,
            None,
        );
        parent.ingredients.insert("child".to_string(), child);

        assert!(!parent.has_failures());
        assert!(parent.has_degraded_ingredients());
        assert_eq!(parent.find_code(ValidationCode::SignatureMismatch).len(), 1);
    }
}
