//! Manifest store decoding
//!
//! A manifest store is the top-level superbox of the container: an
//! ordered list of manifest superboxes, the last of which is the active
//! (provenance) manifest. Each manifest carries an assertion store, a
//! single claim box and a single signature box. The store is immutable
//! once decoded.

use crate::assertion::Assertion;
use crate::claim::Claim;
use crate::error::{Error, Result};
use credence_box::{decode, labels, SuperBox};
use credence_types::{hash_bytes, HashAlgorithm};
use std::collections::HashMap;

/// One assertion as stored: its box label, raw payload bytes and the
/// decoded form
#[derive(Debug, Clone)]
pub struct StoredAssertion {
    pub label: String,
    pub data: Vec<u8>,
    pub assertion: Assertion,
}

/// One decoded manifest: claim, assertions and signature
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Unique label of this manifest within the store
    pub label: String,
    pub claim: Claim,
    /// Claim bytes exactly as stored; the signed payload
    pub claim_bytes: Vec<u8>,
    pub assertions: Vec<StoredAssertion>,
    /// COSE signature bytes from the signature box
    pub signature_bytes: Vec<u8>,
    /// The manifest superbox exactly as stored, header included; the
    /// region ingredient references digest
    pub box_bytes: Vec<u8>,
}

impl Manifest {
    /// Find a stored assertion by its box label
    pub fn get_assertion(&self, label: &str) -> Option<&StoredAssertion> {
        self.assertions.iter().find(|a| a.label == label)
    }

    /// All ingredient assertions in this manifest
    pub fn ingredient_assertions(
        &self,
    ) -> impl Iterator<Item = (&StoredAssertion, &crate::assertion::IngredientAssertion)> {
        self.assertions.iter().filter_map(|stored| match &stored.assertion {
            Assertion::Ingredient(ingredient) => Some((stored, ingredient)),
            _ => None,
        })
    }

    /// All hard-binding assertions in this manifest
    pub fn data_hash_assertions(
        &self,
    ) -> impl Iterator<Item = (&StoredAssertion, &crate::assertion::DataHash)> {
        self.assertions.iter().filter_map(|stored| match &stored.assertion {
            Assertion::DataHash(hash) => Some((stored, hash)),
            _ => None,
        })
    }

    /// All soft-binding assertions in this manifest
    pub fn soft_binding_assertions(
        &self,
    ) -> impl Iterator<Item = (&StoredAssertion, &crate::assertion::SoftBinding)> {
        self.assertions.iter().filter_map(|stored| match &stored.assertion {
            Assertion::SoftBinding(binding) => Some((stored, binding)),
            _ => None,
        })
    }

    /// Digest of the manifest's stored superbox bytes
    pub fn box_digest(&self, alg: HashAlgorithm) -> Vec<u8> {
        hash_bytes(alg, &self.box_bytes)
    }
}

/// An ordered, immutable collection of manifests with a designated
/// active manifest
#[derive(Debug, Clone)]
pub struct ManifestStore {
    manifests: Vec<Manifest>,
    by_label: HashMap<String, usize>,
    active: usize,
}

impl ManifestStore {
    /// Decode a manifest store from container bytes.
    ///
    /// Structural box violations abort with the container error; a
    /// well-formed container with unusable manifest contents fails with
    /// the specific decode error. Unknown top-level superboxes are
    /// skipped per the container rules.
    pub fn from_container(buf: &[u8]) -> Result<Self> {
        let root = decode(buf)?;
        let store_box = SuperBox::from_span(buf, &root)?;

        if &store_box.desc.uuid != labels::STORE_UUID {
            return Err(Error::NotAManifestStore);
        }

        let mut manifests = Vec::new();
        let mut by_label = HashMap::new();

        for manifest_box in store_box.child_super_boxes(buf)? {
            if &manifest_box.desc.uuid != labels::MANIFEST_UUID {
                tracing::debug!(
                    offset = manifest_box.span.offset,
                    "skipping unknown top-level superbox"
                );
                continue;
            }

            let manifest = decode_manifest(buf, &manifest_box)?;
            if by_label.contains_key(&manifest.label) {
                return Err(Error::DuplicateManifestLabel(manifest.label));
            }
            by_label.insert(manifest.label.clone(), manifests.len());
            manifests.push(manifest);
        }

        if manifests.is_empty() {
            return Err(Error::EmptyStore);
        }
        let active = manifests.len() - 1;

        Ok(Self {
            manifests,
            by_label,
            active,
        })
    }

    /// The active (provenance) manifest: the last manifest in the store
    pub fn active_manifest(&self) -> &Manifest {
        &self.manifests[self.active]
    }

    pub fn active_label(&self) -> &str {
        &self.manifests[self.active].label
    }

    /// Look up a manifest by label
    pub fn get(&self, label: &str) -> Option<&Manifest> {
        self.by_label.get(label).map(|&i| &self.manifests[i])
    }

    /// All manifests in container order
    pub fn manifests(&self) -> &[Manifest] {
        &self.manifests
    }
}

fn decode_manifest(buf: &[u8], manifest_box: &SuperBox<'_>) -> Result<Manifest> {
    let label = manifest_box
        .desc
        .label
        .clone()
        .ok_or(Error::UnlabeledManifest(manifest_box.span.offset))?;

    // A manifest with more than one claim box is malformed.
    let claim_box_count = manifest_box
        .child_super_boxes(buf)?
        .iter()
        .filter(|sb| &sb.desc.uuid == labels::CLAIM_UUID)
        .count();
    if claim_box_count > 1 {
        return Err(Error::MultipleClaimBoxes(label));
    }

    let claim_box = manifest_box
        .find_by_label(buf, labels::CLAIM)
        .ok_or_else(|| Error::MissingClaimBox(label.clone()))?;
    let claim_bytes = single_cbor_payload(buf, &claim_box)
        .ok_or_else(|| Error::MissingClaimBox(label.clone()))?
        .to_vec();
    let claim = Claim::from_cbor(&label, &claim_bytes)?;

    let signature_box = manifest_box
        .find_by_label(buf, labels::SIGNATURE)
        .ok_or_else(|| Error::MissingSignatureBox(label.clone()))?;
    let signature_bytes = single_cbor_payload(buf, &signature_box)
        .ok_or_else(|| Error::MissingSignatureBox(label.clone()))?
        .to_vec();

    let mut assertions = Vec::new();
    if let Some(assertion_store) = manifest_box.find_by_label(buf, labels::ASSERTIONS) {
        for assertion_box in assertion_store.child_super_boxes(buf)? {
            let assertion_label = assertion_box
                .desc
                .label
                .clone()
                .ok_or_else(|| Error::MalformedAssertionBox(label.clone()))?;
            let data = single_cbor_payload(buf, &assertion_box)
                .ok_or_else(|| Error::MalformedAssertionBox(label.clone()))?
                .to_vec();
            let assertion = Assertion::decode(&assertion_label, &data)?;
            assertions.push(StoredAssertion {
                label: assertion_label,
                data,
                assertion,
            });
        }
    }

    Ok(Manifest {
        label,
        claim,
        claim_bytes,
        assertions,
        signature_bytes,
        box_bytes: manifest_box.raw_bytes(buf).to_vec(),
    })
}

/// The single CBOR data box payload of a superbox, if it has exactly one
fn single_cbor_payload<'a>(buf: &'a [u8], sb: &SuperBox<'_>) -> Option<&'a [u8]> {
    let boxes: Vec<_> = sb
        .data_boxes()
        .iter()
        .filter(|b| b.box_type == credence_box::BOX_TYPE_CBOR)
        .collect();
    match boxes.as_slice() {
        [one] => Some(one.payload_bytes(buf)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{labels as assertion_labels, DataHash};
    use crate::claim::ClaimGeneratorInfo;
    use credence_box::{cbor_box, super_box};
    use credence_types::{assertion_uri, signature_uri, ByteRange, HashedUri};

    fn sample_manifest_box(label: &str) -> Vec<u8> {
        let data_hash = Assertion::DataHash(DataHash {
            exclusions: vec![ByteRange::new(0, 8)],
            alg: HashAlgorithm::Sha256,
            hash: vec![0x22; 32],
            name: None,
        });
        let assertion_bytes = data_hash.encode().unwrap();

        let claim = Claim {
            claim_generator: "test/1.0".to_string(),
            claim_generator_info: vec![ClaimGeneratorInfo {
                name: "test".to_string(),
                version: None,
            }],
            title: None,
            format: "application/octet-stream".to_string(),
            instance_id: "inst-1".to_string(),
            assertions: vec![HashedUri::new(
                assertion_uri(label, assertion_labels::DATA_HASH),
                None,
                hash_bytes(HashAlgorithm::Sha256, &assertion_bytes),
            )],
            signature: signature_uri(label),
            alg: HashAlgorithm::Sha256,
        };

        let assertion_store = super_box(
            labels::ASSERTION_STORE_UUID,
            Some(labels::ASSERTIONS),
            &[super_box(
                labels::CBOR_ASSERTION_UUID,
                Some(assertion_labels::DATA_HASH),
                &[cbor_box(&assertion_bytes)],
            )],
        );
        let claim_sb = super_box(
            labels::CLAIM_UUID,
            Some(labels::CLAIM),
            &[cbor_box(&claim.to_cbor().unwrap())],
        );
        let signature_sb = super_box(
            labels::SIGNATURE_UUID,
            Some(labels::SIGNATURE),
            &[cbor_box(b"placeholder-signature")],
        );

        super_box(
            labels::MANIFEST_UUID,
            Some(label),
            &[assertion_store, claim_sb, signature_sb],
        )
    }

    fn sample_container(manifest_labels: &[&str]) -> Vec<u8> {
        let manifests: Vec<Vec<u8>> = manifest_labels
            .iter()
            .map(|l| sample_manifest_box(l))
            .collect();
        super_box(labels::STORE_UUID, Some(labels::STORE), &manifests)
    }

    #[test]
    fn test_decode_store() {
        let container = sample_container(&["urn:credence:m1"]);
        let store = ManifestStore::from_container(&container).unwrap();

        assert_eq!(store.manifests().len(), 1);
        let manifest = store.active_manifest();
        assert_eq!(manifest.label, "urn:credence:m1");
        assert_eq!(manifest.claim.claim_generator, "test/1.0");
        assert_eq!(manifest.assertions.len(), 1);
        assert!(manifest.data_hash_assertions().next().is_some());
        assert_eq!(manifest.signature_bytes, b"placeholder-signature");
    }

    #[test]
    fn test_active_is_last_manifest() {
        let container = sample_container(&["urn:credence:m1", "urn:credence:m2"]);
        let store = ManifestStore::from_container(&container).unwrap();
        assert_eq!(store.active_label(), "urn:credence:m2");
        assert!(store.get("urn:credence:m1").is_some());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let container = sample_container(&["urn:credence:m1", "urn:credence:m1"]);
        assert!(matches!(
            ManifestStore::from_container(&container),
            Err(Error::DuplicateManifestLabel(_))
        ));
    }

    #[test]
    fn test_empty_store_rejected() {
        let container = sample_container(&[]);
        assert!(matches!(
            ManifestStore::from_container(&container),
            Err(Error::EmptyStore)
        ));
    }

    #[test]
    fn test_wrong_top_level_uuid_rejected() {
        let container = super_box(labels::MANIFEST_UUID, Some(labels::STORE), &[]);
        assert!(matches!(
            ManifestStore::from_container(&container),
            Err(Error::NotAManifestStore)
        ));
    }

    #[test]
    fn test_unknown_top_level_superbox_skipped() {
        let stray = super_box(labels::CBOR_ASSERTION_UUID, Some("vendor.extra"), &[]);
        let manifest = sample_manifest_box("urn:credence:m1");
        let container = super_box(labels::STORE_UUID, Some(labels::STORE), &[stray, manifest]);

        let store = ManifestStore::from_container(&container).unwrap();
        assert_eq!(store.manifests().len(), 1);
    }

    #[test]
    fn test_claim_bytes_kept_verbatim() {
        let container = sample_container(&["urn:credence:m1"]);
        let store = ManifestStore::from_container(&container).unwrap();
        let manifest = store.active_manifest();
        let reencoded = manifest.claim.to_cbor().unwrap();
        assert_eq!(manifest.claim_bytes, reencoded);
    }

    #[test]
    fn test_missing_signature_box_rejected() {
        let claim_only = super_box(
            labels::MANIFEST_UUID,
            Some("urn:credence:m1"),
            &[super_box(
                labels::CLAIM_UUID,
                Some(labels::CLAIM),
                &[cbor_box(b"\xa0")],
            )],
        );
        let container = super_box(labels::STORE_UUID, Some(labels::STORE), &[claim_only]);
        let result = ManifestStore::from_container(&container);
        assert!(result.is_err());
    }
}
