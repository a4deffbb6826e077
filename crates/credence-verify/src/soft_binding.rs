//! Soft-binding fingerprint algorithms
//!
//! Soft bindings tolerate benign transformations of the asset, so a
//! comparison yields a confidence-bounded result under the algorithm's
//! own semantics, never a binary pass/fail. Algorithms are looked up by
//! the identifier stored in the assertion; unknown identifiers are
//! surfaced as unevaluated rather than failing the manifest.

/// Result of comparing a stored fingerprint to a recomputed one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftMatch {
    /// Similarity in `[0, 1]`, 1 being identical
    pub score: f64,
    /// The algorithm's own judgement of whether this is a match
    pub likely_match: bool,
}

/// One fingerprint algorithm
pub trait SoftBindingAlgorithm: Send + Sync {
    /// Identifier stored in soft-binding assertions
    fn name(&self) -> &str;

    /// Compute the fingerprint of an asset
    fn fingerprint(&self, asset: &[u8]) -> Vec<u8>;

    /// Compare a stored fingerprint against a recomputed one under this
    /// algorithm's tolerance
    fn compare(&self, expected: &[u8], actual: &[u8]) -> SoftMatch;
}

/// Reference algorithm: per-block mean byte values.
///
/// The asset is split into a fixed number of blocks and each block
/// contributes its mean byte value to the fingerprint. Local edits move
/// a few block means; wholesale replacement moves most of them. The
/// comparison score is one minus the normalized mean absolute
/// difference of the block means.
pub struct BlockMeanFingerprint {
    blocks: usize,
    threshold: f64,
}

impl BlockMeanFingerprint {
    pub const NAME: &'static str = "credence.blockmean";

    pub fn new() -> Self {
        Self {
            blocks: 64,
            threshold: 0.95,
        }
    }
}

impl Default for BlockMeanFingerprint {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftBindingAlgorithm for BlockMeanFingerprint {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fingerprint(&self, asset: &[u8]) -> Vec<u8> {
        if asset.is_empty() {
            return vec![0; self.blocks];
        }
        let block_len = asset.len().div_ceil(self.blocks);
        (0..self.blocks)
            .map(|i| {
                let start = i * block_len;
                if start >= asset.len() {
                    return 0;
                }
                let end = usize::min(start + block_len, asset.len());
                let block = &asset[start..end];
                let sum: u64 = block.iter().map(|&b| u64::from(b)).sum();
                (sum / block.len() as u64) as u8
            })
            .collect()
    }

    fn compare(&self, expected: &[u8], actual: &[u8]) -> SoftMatch {
        if expected.len() != actual.len() || expected.is_empty() {
            return SoftMatch {
                score: 0.0,
                likely_match: false,
            };
        }
        let total_diff: u64 = expected
            .iter()
            .zip(actual)
            .map(|(&a, &b)| u64::from(a.abs_diff(b)))
            .sum();
        let score = 1.0 - total_diff as f64 / (expected.len() as f64 * 255.0);
        SoftMatch {
            score,
            likely_match: score >= self.threshold,
        }
    }
}

/// The set of soft-binding algorithms available to a verification call
#[derive(Default)]
pub struct SoftBindingRegistry {
    algorithms: Vec<Box<dyn SoftBindingAlgorithm>>,
}

impl SoftBindingRegistry {
    /// An empty registry: every soft binding reports as unevaluated
    pub fn new() -> Self {
        Self::default()
    }

    /// The default registry with the reference algorithm registered
    pub fn with_defaults() -> Self {
        Self::new().register(Box::new(BlockMeanFingerprint::new()))
    }

    pub fn register(mut self, algorithm: Box<dyn SoftBindingAlgorithm>) -> Self {
        self.algorithms.push(algorithm);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn SoftBindingAlgorithm> {
        self.algorithms
            .iter()
            .find(|a| a.name() == name)
            .map(Box::as_ref)
    }
}
