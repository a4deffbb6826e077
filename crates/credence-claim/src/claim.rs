//! The claim structure
//!
//! A claim is the signed statement at the heart of a manifest: who
//! generated it, which asset it describes, and hashed references to
//! every assertion it covers. The claim's stored CBOR bytes are the
//! exact signed payload, so they are retained verbatim alongside the
//! decoded form.

use crate::error::{Error, Result};
use credence_types::{HashAlgorithm, HashedUri};
use serde::{Deserialize, Serialize};

/// Identity of the software that produced a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimGeneratorInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The structured claim record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Generator identity string, e.g. `acme-editor/3.1`
    pub claim_generator: String,
    pub claim_generator_info: Vec<ClaimGeneratorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Media type of the asset this claim describes
    pub format: String,
    /// Instance identifier of the asset this claim describes
    pub instance_id: String,
    /// Hashed references to the assertions this claim covers
    pub assertions: Vec<HashedUri>,
    /// URI of the signature box for this claim
    pub signature: String,
    /// Default digest algorithm for references without their own
    pub alg: HashAlgorithm,
}

impl Claim {
    /// Decode a claim from its stored CBOR bytes
    pub fn from_cbor(label: &str, bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| Error::ClaimDecode {
            label: label.to_string(),
            reason: e.to_string(),
        })
    }

    /// Encode the claim to CBOR.
    ///
    /// Field order is fixed by the struct, so encoding is deterministic:
    /// the same claim always produces the same bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        ciborium::into_writer(self, &mut out).map_err(|e| Error::Encode(e.to_string()))?;
        Ok(out)
    }

    /// Find the assertion reference whose URI ends with `label`
    pub fn assertion_ref(&self, label: &str) -> Option<&HashedUri> {
        self.assertions
            .iter()
            .find(|r| r.url.rsplit('/').next() == Some(label))
    }

    /// The digest algorithm for one assertion reference
    pub fn ref_alg(&self, reference: &HashedUri) -> HashAlgorithm {
        reference.alg.unwrap_or(self.alg)
    }
}
