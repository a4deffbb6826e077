//! Verification options
//!
//! Policy knobs that are not trust material: recursion limits, the
//! severity of a missing hard binding, and the soft-binding algorithm
//! registry.

use crate::soft_binding::SoftBindingRegistry;

/// Default maximum ingredient recursion depth
pub const DEFAULT_MAX_INGREDIENT_DEPTH: usize = 8;

/// How the absence of a hard binding on the active manifest is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingHardBinding {
    /// Record it and keep the manifest eligible for a trusted verdict
    #[default]
    ReportOnly,
    /// Treat it as a failure of the active manifest
    Fail,
}

/// Options for one verification call
pub struct VerifyOptions {
    /// Ingredient recursion beyond this depth fails that branch
    pub max_ingredient_depth: usize,
    /// Severity of a missing hard binding on the active manifest
    pub missing_hard_binding: MissingHardBinding,
    /// Soft-binding algorithms available for fingerprint evaluation
    pub soft_bindings: SoftBindingRegistry,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            max_ingredient_depth: DEFAULT_MAX_INGREDIENT_DEPTH,
            missing_hard_binding: MissingHardBinding::default(),
            soft_bindings: SoftBindingRegistry::with_defaults(),
        }
    }
}

impl VerifyOptions {
    pub fn with_max_ingredient_depth(mut self, depth: usize) -> Self {
        self.max_ingredient_depth = depth;
        self
    }

    pub fn with_missing_hard_binding(mut self, policy: MissingHardBinding) -> Self {
        self.missing_hard_binding = policy;
        self
    }

    pub fn with_soft_bindings(mut self, registry: SoftBindingRegistry) -> Self {
        self.soft_bindings = registry;
        self
    }
}
