use credence::claim::{Action, Actions, Assertion};
use credence::{Ed25519Signer, ManifestBuilder};
use ed25519_dalek::pkcs8::DecodePrivateKey;
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!(
            "Usage: {} <file-to-sign> <output-container> <output-roots-pem>",
            args[0]
        );
        std::process::exit(1);
    }
    let file_path = PathBuf::from(&args[1]);
    let container_path = PathBuf::from(&args[2]);
    let roots_path = PathBuf::from(&args[3]);

    println!("Signing file: {file_path:?}");
    let asset = fs::read(&file_path)?;

    // Mint a throwaway root and leaf; real deployments bring their own
    // credential and implement `Signer` over it.
    println!("Generating ephemeral signing credential...");
    let ca_key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519)?;
    let mut ca_params = rcgen::CertificateParams::new(Vec::new())?;
    ca_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    ca_params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "credence example root");
    let ca_cert = ca_params.self_signed(&ca_key)?;

    let leaf_rc_key = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519)?;
    let mut leaf_params = rcgen::CertificateParams::new(Vec::new())?;
    leaf_params
        .distinguished_name
        .push(rcgen::DnType::CommonName, "credence example signer");
    let leaf_cert = leaf_params.signed_by(&leaf_rc_key, &ca_cert, &ca_key)?;

    let leaf_key = ed25519_dalek::SigningKey::from_pkcs8_der(&leaf_rc_key.serialize_der())?;
    let signer = Ed25519Signer::new(leaf_key, vec![leaf_cert.der().to_vec()]);

    println!("Building and signing manifest...");
    let title = file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    let container = ManifestBuilder::new(
        "credence-example/0.2",
        "application/octet-stream",
        format!("xmp:iid:{title}"),
    )
    .with_title(title)
    .add_assertion(Assertion::Actions(Actions {
        actions: vec![Action {
            action: "credence.created".to_string(),
            when: None,
            software_agent: Some("credence-example/0.2".to_string()),
            parameters: None,
        }],
    }))
    .sign(&asset, &signer)?;

    fs::write(&container_path, &container)?;
    fs::write(&roots_path, ca_cert.pem())?;
    println!("Wrote container to {container_path:?} ({} bytes)", container.len());
    println!("Wrote trust root to {roots_path:?}");

    Ok(())
}
