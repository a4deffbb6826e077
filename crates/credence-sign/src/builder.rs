//! Manifest assembly and signing
//!
//! [`ManifestBuilder`] collects caller assertions and ingredient
//! containers, computes the hard binding over the target asset, and
//! emits a signed manifest store. The manifest label is derived from the
//! claim content, so identical inputs produce identical container bytes
//! (given a deterministic signer).

use crate::error::{Error, Result};
use credence_box::{cbor_box, labels, super_box};
use credence_claim::{
    Assertion, Claim, ClaimGeneratorInfo, DataHash, IngredientAssertion, Manifest, ManifestStore,
    Relationship,
};
use credence_crypto::{CoseSign1, Signer};
use credence_types::{
    assertion_uri, hash_bytes, hash_with_exclusions, manifest_uri, signature_uri, ByteRange,
    HashAlgorithm, HashedUri,
};
use std::collections::HashMap;

/// Label used while serializing the claim to derive the real label from
const PENDING_LABEL: &str = "urn:credence:pending";

/// One ingredient supplied to the builder: the prior asset's own
/// manifest-store container plus how it relates to the new asset.
pub struct IngredientInput {
    pub title: String,
    pub format: String,
    pub instance_id: String,
    pub relationship: Relationship,
    /// The ingredient's manifest-store container bytes
    pub container: Vec<u8>,
}

impl IngredientInput {
    pub fn new(
        title: impl Into<String>,
        format: impl Into<String>,
        instance_id: impl Into<String>,
        relationship: Relationship,
        container: Vec<u8>,
    ) -> Self {
        Self {
            title: title.into(),
            format: format.into(),
            instance_id: instance_id.into(),
            relationship,
            container,
        }
    }
}

/// Assembles and signs one manifest over a target asset.
pub struct ManifestBuilder {
    claim_generator: String,
    generator_info: Vec<ClaimGeneratorInfo>,
    title: Option<String>,
    format: String,
    instance_id: String,
    alg: HashAlgorithm,
    exclusions: Vec<ByteRange>,
    assertions: Vec<Assertion>,
    ingredients: Vec<IngredientInput>,
    allow_invalid_ingredients: bool,
}

impl ManifestBuilder {
    pub fn new(
        claim_generator: impl Into<String>,
        format: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        let claim_generator = claim_generator.into();
        let generator_info = generator_info_from(&claim_generator);
        Self {
            claim_generator,
            generator_info,
            title: None,
            format: format.into(),
            instance_id: instance_id.into(),
            alg: HashAlgorithm::Sha256,
            exclusions: Vec::new(),
            assertions: Vec::new(),
            ingredients: Vec::new(),
            allow_invalid_ingredients: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_alg(mut self, alg: HashAlgorithm) -> Self {
        self.alg = alg;
        self
    }

    /// Byte ranges of the target asset excluded from the hard binding,
    /// typically the region the container will be embedded into
    pub fn with_hard_binding_exclusions(mut self, exclusions: Vec<ByteRange>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn add_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    pub fn add_ingredient(mut self, ingredient: IngredientInput) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// Sign even when a supplied ingredient fails its pre-flight
    /// validation. Off by default: a broken provenance chain is worth
    /// more as an error than as a fresh signature over it.
    pub fn allow_invalid_ingredients(mut self, allow: bool) -> Self {
        self.allow_invalid_ingredients = allow;
        self
    }

    /// Build, sign and serialize the manifest store.
    ///
    /// Every supplied ingredient container is decoded and pre-flight
    /// checked first; its manifests are carried into the new store
    /// byte-for-byte so the ingredient references' digests stay valid.
    pub fn sign(&self, asset: &[u8], signer: &dyn Signer) -> Result<Vec<u8>> {
        // Resolve ingredients: embed their manifests and build the
        // reference assertions pointing at each store's active manifest.
        let mut embedded: Vec<(String, Vec<u8>)> = Vec::new();
        let mut ingredient_assertions = Vec::new();

        for input in &self.ingredients {
            let store = ManifestStore::from_container(&input.container)?;

            for manifest in store.manifests() {
                match embedded.iter().find(|(label, _)| label == &manifest.label) {
                    // Shared ancestors arrive once per referencing
                    // ingredient; identical bytes collapse to one copy.
                    Some((_, bytes)) if bytes == &manifest.box_bytes => {}
                    Some(_) => {
                        return Err(Error::ConflictingIngredientManifests(
                            manifest.label.clone(),
                        ));
                    }
                    None => {
                        embedded.push((manifest.label.clone(), manifest.box_bytes.clone()));
                    }
                }
            }

            for manifest in store.manifests() {
                if let Err(reason) = preflight(manifest) {
                    if self.allow_invalid_ingredients {
                        tracing::warn!(
                            title = %input.title,
                            manifest = %manifest.label,
                            %reason,
                            "embedding ingredient that failed validation"
                        );
                    } else {
                        return Err(Error::BrokenIngredient {
                            title: input.title.clone(),
                            reason,
                        });
                    }
                }
            }

            let active = store.active_manifest();
            ingredient_assertions.push(Assertion::Ingredient(IngredientAssertion {
                title: input.title.clone(),
                format: input.format.clone(),
                instance_id: input.instance_id.clone(),
                relationship: input.relationship,
                manifest: Some(HashedUri::new(
                    manifest_uri(&active.label),
                    Some(self.alg),
                    active.box_digest(self.alg),
                )),
            }));
        }

        // The hard binding over the target asset closes the assertion
        // list.
        let hash = hash_with_exclusions(self.alg, asset, &self.exclusions)?;
        let data_hash = Assertion::DataHash(DataHash {
            exclusions: self.exclusions.clone(),
            alg: self.alg,
            hash,
            name: None,
        });

        let mut counts = HashMap::new();
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        for assertion in self
            .assertions
            .iter()
            .chain(&ingredient_assertions)
            .chain(std::iter::once(&data_hash))
        {
            let label = unique_label(&mut counts, assertion.label());
            entries.push((label, assertion.encode()?));
        }

        // The label is the digest of the claim serialized with a
        // placeholder label, so it is a pure function of the claim
        // content.
        let pending_bytes = self.assemble_claim(PENDING_LABEL, &entries).to_cbor()?;
        let digest = hash_bytes(self.alg, &pending_bytes);
        let label = format!("urn:credence:{}", &hex::encode(digest)[..32]);

        let claim_bytes = self.assemble_claim(&label, &entries).to_cbor()?;
        let cose = CoseSign1::sign(&claim_bytes, signer)?;

        let assertion_boxes: Vec<Vec<u8>> = entries
            .iter()
            .map(|(a_label, bytes)| {
                super_box(labels::CBOR_ASSERTION_UUID, Some(a_label), &[cbor_box(bytes)])
            })
            .collect();

        let manifest_box = super_box(
            labels::MANIFEST_UUID,
            Some(&label),
            &[
                super_box(
                    labels::ASSERTION_STORE_UUID,
                    Some(labels::ASSERTIONS),
                    &assertion_boxes,
                ),
                super_box(
                    labels::CLAIM_UUID,
                    Some(labels::CLAIM),
                    &[cbor_box(&claim_bytes)],
                ),
                super_box(
                    labels::SIGNATURE_UUID,
                    Some(labels::SIGNATURE),
                    &[cbor_box(&cose.to_bytes()?)],
                ),
            ],
        );

        // Ingredient manifests first, the new (active) manifest last.
        let mut boxes: Vec<Vec<u8>> = embedded.into_iter().map(|(_, bytes)| bytes).collect();
        boxes.push(manifest_box);
        Ok(super_box(labels::STORE_UUID, Some(labels::STORE), &boxes))
    }

    fn assemble_claim(&self, label: &str, entries: &[(String, Vec<u8>)]) -> Claim {
        Claim {
            claim_generator: self.claim_generator.clone(),
            claim_generator_info: self.generator_info.clone(),
            title: self.title.clone(),
            format: self.format.clone(),
            instance_id: self.instance_id.clone(),
            assertions: entries
                .iter()
                .map(|(a_label, bytes)| {
                    HashedUri::new(
                        assertion_uri(label, a_label),
                        None,
                        hash_bytes(self.alg, bytes),
                    )
                })
                .collect(),
            signature: signature_uri(label),
            alg: self.alg,
        }
    }
}

/// Sign a manifest store over `asset` with default claim metadata.
///
/// The instance identifier is derived from the asset digest, so the
/// output is a pure function of the inputs and the signer.
pub fn sign(
    assertions: Vec<Assertion>,
    ingredients: Vec<IngredientInput>,
    signer: &dyn Signer,
    asset: &[u8],
) -> Result<Vec<u8>> {
    let alg = HashAlgorithm::Sha256;
    let instance_id = format!("xmp:iid:{}", &hex::encode(hash_bytes(alg, asset))[..32]);

    let mut builder = ManifestBuilder::new(
        concat!("credence/", env!("CARGO_PKG_VERSION")),
        "application/octet-stream",
        instance_id,
    );
    for assertion in assertions {
        builder = builder.add_assertion(assertion);
    }
    for ingredient in ingredients {
        builder = builder.add_ingredient(ingredient);
    }
    builder.sign(asset, signer)
}

/// Claim/assertion integrity and signature self-consistency for one
/// already-stored manifest. Trust-chain evaluation is the verifier's
/// job; signing only refuses to build on top of bytes that no longer
/// match their own claim.
fn preflight(manifest: &Manifest) -> std::result::Result<(), String> {
    for reference in &manifest.claim.assertions {
        let label = reference
            .url
            .rsplit('/')
            .next()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| format!("unparseable assertion reference {}", reference.url))?;
        let stored = manifest
            .get_assertion(label)
            .ok_or_else(|| format!("assertion {label} missing from store"))?;
        let alg = manifest.claim.ref_alg(reference);
        if hash_bytes(alg, &stored.data) != reference.hash {
            return Err(format!("assertion {label} does not match its claim digest"));
        }
    }

    let cose = CoseSign1::from_bytes(&manifest.signature_bytes).map_err(|e| e.to_string())?;
    cose.verify(&manifest.claim_bytes)
        .map_err(|e| format!("claim signature: {e}"))?;
    Ok(())
}

/// Assertion-store labels must be unique; repeated kinds take a
/// multiplicity suffix the decoder strips for dispatch.
fn unique_label(counts: &mut HashMap<String, usize>, base: &str) -> String {
    let n = counts.entry(base.to_string()).or_insert(0);
    *n += 1;
    if *n == 1 {
        base.to_string()
    } else {
        format!("{base}__{n}")
    }
}

fn generator_info_from(generator: &str) -> Vec<ClaimGeneratorInfo> {
    let (name, version) = match generator.split_once('/') {
        Some((name, version)) => (name.to_string(), Some(version.to_string())),
        None => (generator.to_string(), None),
    };
    vec![ClaimGeneratorInfo { name, version }]
}
