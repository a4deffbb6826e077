//! Sign-then-verify round trips through the public API
//!
//! Containers here are produced by the real signing path and checked by
//! the real verification pipeline; the only synthetic parts are the
//! throwaway PKI and the byte-level tampering between the two.

use credence::claim::{Action, Actions, Assertion, Relationship};
use credence::container::{decode, labels as box_labels, SuperBox};
use credence::{
    verify, verify_with_options, Ed25519Signer, IngredientInput, ManifestBuilder, ManifestStore,
    TrustConfig, TrustVerdict, ValidationCode, VerifyOptions,
};

struct TestPki {
    signer: Ed25519Signer,
    ca_der: Vec<u8>,
}

fn test_pki(seed: u8) -> TestPki {
    use ed25519_dalek::pkcs8::EncodePrivateKey;

    let ca_key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519).unwrap();
    let mut ca_params = rcgen::CertificateParams::new(Vec::new()).unwrap();
    ca_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    ca_params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "round-trip test root");
    let ca_cert = ca_params.self_signed(&ca_key).unwrap();

    let leaf_signing_key = ed25519_dalek::SigningKey::from_bytes(&[seed; 32]);
    let leaf_pkcs8 = leaf_signing_key.to_pkcs8_der().unwrap();
    let leaf_key = rcgen::KeyPair::try_from(leaf_pkcs8.as_bytes()).unwrap();
    let mut leaf_params = rcgen::CertificateParams::new(Vec::new()).unwrap();
    leaf_params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "round-trip test leaf");
    let leaf_cert = leaf_params.signed_by(&leaf_key, &ca_cert, &ca_key).unwrap();

    TestPki {
        signer: Ed25519Signer::new(leaf_signing_key, vec![leaf_cert.der().to_vec()]),
        ca_der: ca_cert.der().to_vec(),
    }
}

fn trust_for(pki: &TestPki) -> TrustConfig {
    TrustConfig::new().with_anchor(pki.ca_der.clone())
}

fn created_action() -> Assertion {
    Assertion::Actions(Actions {
        actions: vec![Action {
            action: "credence.created".to_string(),
            when: None,
            software_agent: Some("integration-test/0.2".to_string()),
            parameters: None,
        }],
    })
}

fn builder(instance_id: &str) -> ManifestBuilder {
    ManifestBuilder::new("integration-test/0.2", "application/octet-stream", instance_id)
        .add_assertion(created_action())
}

/// Payload byte range of one box inside the active (last) manifest of a
/// container, located by its label.
fn payload_range(container: &[u8], label: &str) -> std::ops::Range<usize> {
    let root = decode(container).unwrap();
    let store = SuperBox::from_span(container, &root).unwrap();
    let manifest_span = store
        .data_boxes()
        .iter()
        .rev()
        .find(|b| b.is_superbox())
        .unwrap();
    let manifest = SuperBox::from_span(container, manifest_span).unwrap();
    let target = match manifest.find_by_label(container, label) {
        Some(found) => found,
        None => manifest
            .find_by_label(container, box_labels::ASSERTIONS)
            .unwrap()
            .find_by_label(container, label)
            .unwrap(),
    };
    target.data_boxes()[0].payload.clone()
}

#[test]
fn test_sign_then_verify_is_trusted() {
    let asset: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
    let pki = test_pki(41);
    let container = builder("rt-1").sign(&asset, &pki.signer).unwrap();

    let report = verify(&asset, &container, &trust_for(&pki)).unwrap();
    assert_eq!(report.verdict, TrustVerdict::Trusted);
    assert!(report.find_code(ValidationCode::DataHashMismatch).is_empty());
    assert!(report.find_code(ValidationCode::SignatureMismatch).is_empty());
    assert_eq!(report.find_code(ValidationCode::DataHashMatch).len(), 1);
    assert_eq!(
        report.find_code(ValidationCode::ClaimSignatureValidated).len(),
        1
    );
}

#[test]
fn test_ingredient_chain_round_trip() {
    let pki = test_pki(42);

    let source = builder("rt-src").sign(&[0x10u8; 512], &pki.signer).unwrap();
    let asset = vec![0x20u8; 512];
    let container = builder("rt-2")
        .add_ingredient(IngredientInput::new(
            "source.bin",
            "application/octet-stream",
            "rt-src",
            Relationship::ParentOf,
            source,
        ))
        .sign(&asset, &pki.signer)
        .unwrap();

    let report = verify(&asset, &container, &trust_for(&pki)).unwrap();
    assert_eq!(report.verdict, TrustVerdict::Trusted);
    assert_eq!(report.find_code(ValidationCode::IngredientValidated).len(), 1);

    let active = report.active_report().unwrap();
    assert_eq!(active.ingredients.len(), 1);
    assert!(active.ingredients.values().all(|r| !r.has_failures()));
}

#[test]
fn test_assertion_byte_flip_is_tampering() {
    let asset = vec![0x30u8; 512];
    let pki = test_pki(43);
    let mut container = builder("rt-3").sign(&asset, &pki.signer).unwrap();

    // Flip the low bit of the last payload byte (inside a CBOR text
    // string, so the payload still decodes) while the claim keeps the
    // original digest.
    let range = payload_range(&container, "credence.actions");
    container[range.end - 1] ^= 0x01;

    let report = verify(&asset, &container, &trust_for(&pki)).unwrap();
    assert_eq!(report.verdict, TrustVerdict::NotTrusted);
    let tampered = report.find_code(ValidationCode::AssertionTampered);
    assert_eq!(tampered.len(), 1);
    assert_eq!(tampered[0].detail.as_deref(), Some("credence.actions"));
}

#[test]
fn test_asset_mutation_is_content_modified() {
    let asset = vec![0x40u8; 512];
    let pki = test_pki(44);
    let container = builder("rt-4")
        .with_hard_binding_exclusions(vec![credence::ByteRange::new(0, 16)])
        .sign(&asset, &pki.signer)
        .unwrap();

    // Outside the exclusion zone: content-modified, signature intact.
    let mut outside = asset.clone();
    outside[100] ^= 0xff;
    let report = verify(&outside, &container, &trust_for(&pki)).unwrap();
    assert_eq!(report.verdict, TrustVerdict::NotTrusted);
    assert_eq!(report.find_code(ValidationCode::DataHashMismatch).len(), 1);
    assert!(report.find_code(ValidationCode::SignatureMismatch).is_empty());

    // Inside the exclusion zone: still trusted.
    let mut inside = asset;
    inside[4] ^= 0xff;
    let report = verify(&inside, &container, &trust_for(&pki)).unwrap();
    assert_eq!(report.verdict, TrustVerdict::Trusted);
}

#[test]
fn test_root_absent_from_trust_config() {
    let asset = vec![0x50u8; 512];
    let signing_pki = test_pki(45);
    let verifying_pki = test_pki(46);
    let container = builder("rt-5").sign(&asset, &signing_pki.signer).unwrap();

    let report = verify(&asset, &container, &trust_for(&verifying_pki)).unwrap();
    assert_eq!(report.verdict, TrustVerdict::NotTrusted);
    assert_eq!(report.find_code(ValidationCode::CredentialUntrusted).len(), 1);
}

#[test]
fn test_same_inputs_verify_identically() {
    let asset = vec![0x60u8; 1024];
    let pki = test_pki(47);
    let container = builder("rt-6").sign(&asset, &pki.signer).unwrap();
    let trust = trust_for(&pki);

    let first = verify(&asset, &container, &trust).unwrap();
    let second = verify(&asset, &container, &trust).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_depth_limit_lands_on_boundary_manifest() {
    let pki = test_pki(48);

    // Four generations: inner -> mid -> outer -> active.
    let inner = builder("rt-d1").sign(&[1u8; 128], &pki.signer).unwrap();
    let inner_label = ManifestStore::from_container(&inner)
        .unwrap()
        .active_label()
        .to_string();

    let mid = builder("rt-d2")
        .add_ingredient(IngredientInput::new(
            "inner.bin",
            "application/octet-stream",
            "rt-d1",
            Relationship::ParentOf,
            inner,
        ))
        .sign(&[2u8; 128], &pki.signer)
        .unwrap();
    let mid_label = ManifestStore::from_container(&mid)
        .unwrap()
        .active_label()
        .to_string();

    let outer = builder("rt-d3")
        .add_ingredient(IngredientInput::new(
            "mid.bin",
            "application/octet-stream",
            "rt-d2",
            Relationship::ParentOf,
            mid,
        ))
        .sign(&[3u8; 128], &pki.signer)
        .unwrap();
    let outer_label = ManifestStore::from_container(&outer)
        .unwrap()
        .active_label()
        .to_string();

    let asset = vec![4u8; 128];
    let container = builder("rt-d4")
        .add_ingredient(IngredientInput::new(
            "outer.bin",
            "application/octet-stream",
            "rt-d3",
            Relationship::ParentOf,
            outer,
        ))
        .sign(&asset, &pki.signer)
        .unwrap();

    let options = VerifyOptions::default().with_max_ingredient_depth(2);
    let report =
        verify_with_options(&asset, &container, &trust_for(&pki), &options).unwrap();

    // The walk stops exactly two edges in: the outer ingredient is fully
    // validated, the mid manifest carries the boundary failure, and the
    // innermost manifest is never entered.
    let active = report.active_report().unwrap();
    let outer_report = active.ingredients.get(&outer_label).unwrap();
    assert!(!outer_report
        .checks
        .iter()
        .any(|c| c.code == ValidationCode::IngredientDepthExceeded));
    let mid_report = outer_report.ingredients.get(&mid_label).unwrap();
    assert!(mid_report
        .checks
        .iter()
        .any(|c| c.code == ValidationCode::IngredientDepthExceeded));
    assert!(mid_report.ingredients.is_empty());
    assert!(!active.ingredients.contains_key(&inner_label));
    assert_eq!(report.verdict, TrustVerdict::Indeterminate);
}

#[test]
fn test_opted_in_broken_ingredient_degrades_verdict() {
    let pki = test_pki(49);

    let mut source = builder("rt-7src").sign(&[5u8; 256], &pki.signer).unwrap();
    // Corrupt the ingredient's signature bytes before embedding it.
    let range = payload_range(&source, box_labels::SIGNATURE);
    source[range.end - 2] ^= 0x01;

    let asset = vec![6u8; 256];
    let container = builder("rt-7")
        .add_ingredient(IngredientInput::new(
            "broken.bin",
            "application/octet-stream",
            "rt-7src",
            Relationship::ParentOf,
            source,
        ))
        .allow_invalid_ingredients(true)
        .sign(&asset, &pki.signer)
        .unwrap();

    let report = verify(&asset, &container, &trust_for(&pki)).unwrap();
    // The active manifest itself is clean; the broken branch keeps the
    // overall answer from being positive.
    assert_eq!(report.verdict, TrustVerdict::Indeterminate);
    assert!(!report.active_report().unwrap().has_failures());
    assert_eq!(report.find_code(ValidationCode::SignatureMismatch).len(), 1);
}
