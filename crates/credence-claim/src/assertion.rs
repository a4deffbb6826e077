//! Assertion payloads
//!
//! Assertions are a closed tagged union dispatched on the assertion's
//! box label, plus an explicit `Unrecognized` escape variant carrying
//! raw bytes. An unknown-but-well-formed future assertion kind decodes
//! to `Unrecognized` and degrades to a reportable no-op instead of a
//! failure.

use crate::error::{Error, Result};
use ciborium::Value;
use credence_types::{ByteRange, HashAlgorithm, HashedUri};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Assertion box labels
pub mod labels {
    /// Edit actions applied to the asset
    pub const ACTIONS: &str = "credence.actions";
    /// Hard binding: content hash over exclusion-zoned asset bytes
    pub const DATA_HASH: &str = "credence.hash.data";
    /// Soft binding: perceptual/structural fingerprint
    pub const SOFT_BINDING: &str = "credence.soft_binding";
    /// Reference to a source asset's own manifest
    pub const INGREDIENT: &str = "credence.ingredient";
    /// Free-form authorship/ownership metadata
    pub const METADATA: &str = "credence.metadata";
}

/// One edit operation applied to the asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Operation identifier, e.g. `credence.created` or `credence.edited`
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// The actions assertion payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    pub actions: Vec<Action>,
}

/// Hard-binding assertion: a digest over the asset with the credential
/// region excluded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataHash {
    pub exclusions: Vec<ByteRange>,
    pub alg: HashAlgorithm,
    #[serde(with = "serde_bytes")]
    pub hash: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Soft-binding assertion: an algorithm-defined fingerprint compared
/// under that algorithm's own tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftBinding {
    /// Fingerprint algorithm identifier
    pub alg: String,
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
}

/// Relationship of an ingredient to the asset it feeds into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    #[serde(rename = "parentOf")]
    ParentOf,
    #[serde(rename = "componentOf")]
    ComponentOf,
}

/// Ingredient assertion: a prior asset consumed in producing this one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientAssertion {
    pub title: String,
    pub format: String,
    pub instance_id: String,
    pub relationship: Relationship,
    /// Hashed reference to the ingredient's manifest in this store;
    /// absent for ingredients that carried no credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<HashedUri>,
}

/// A decoded assertion payload
#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    Actions(Actions),
    DataHash(DataHash),
    SoftBinding(SoftBinding),
    Ingredient(IngredientAssertion),
    Metadata(Value),
    /// A well-formed assertion of a kind this verifier does not know.
    /// Preserved, surfaced as unrecognized, never validated.
    Unrecognized { label: String, data: Vec<u8> },
}

fn from_cbor<T: DeserializeOwned>(label: &str, data: &[u8]) -> Result<T> {
    ciborium::from_reader(data).map_err(|e| Error::AssertionDecode {
        label: label.to_string(),
        reason: e.to_string(),
    })
}

fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out).map_err(|e| Error::Encode(e.to_string()))?;
    Ok(out)
}

impl Assertion {
    /// Decode an assertion payload, dispatching on the box label.
    ///
    /// Labels may carry a `__N` multiplicity suffix; dispatch uses the
    /// base label. A known label with an undecodable payload is an
    /// error; an unknown label is preserved as `Unrecognized`.
    pub fn decode(label: &str, data: &[u8]) -> Result<Self> {
        let base = label.split("__").next().unwrap_or(label);
        match base {
            labels::ACTIONS => Ok(Assertion::Actions(from_cbor(label, data)?)),
            labels::DATA_HASH => Ok(Assertion::DataHash(from_cbor(label, data)?)),
            labels::SOFT_BINDING => Ok(Assertion::SoftBinding(from_cbor(label, data)?)),
            labels::INGREDIENT => Ok(Assertion::Ingredient(from_cbor(label, data)?)),
            labels::METADATA => Ok(Assertion::Metadata(from_cbor(label, data)?)),
            _ => {
                tracing::debug!(label, "preserving unrecognized assertion");
                Ok(Assertion::Unrecognized {
                    label: label.to_string(),
                    data: data.to_vec(),
                })
            }
        }
    }

    /// Encode the payload to CBOR bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Assertion::Actions(a) => to_cbor(a),
            Assertion::DataHash(d) => to_cbor(d),
            Assertion::SoftBinding(s) => to_cbor(s),
            Assertion::Ingredient(i) => to_cbor(i),
            Assertion::Metadata(m) => to_cbor(m),
            Assertion::Unrecognized { data, .. } => Ok(data.clone()),
        }
    }

    /// The base box label for this assertion kind
    pub fn label(&self) -> &str {
        match self {
            Assertion::Actions(_) => labels::ACTIONS,
            Assertion::DataHash(_) => labels::DATA_HASH,
            Assertion::SoftBinding(_) => labels::SOFT_BINDING,
            Assertion::Ingredient(_) => labels::INGREDIENT,
            Assertion::Metadata(_) => labels::METADATA,
            Assertion::Unrecognized { label, .. } => label,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Assertion::Unrecognized { .. })
    }
}
