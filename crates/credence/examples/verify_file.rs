use credence::{verify, TrustConfig, TrustVerdict};
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} <asset> <container> <roots-pem>", args[0]);
        std::process::exit(1);
    }
    let asset_path = PathBuf::from(&args[1]);
    let container_path = PathBuf::from(&args[2]);
    let roots_path = PathBuf::from(&args[3]);

    let asset = fs::read(&asset_path)?;
    let container = fs::read(&container_path)?;
    let trust = TrustConfig::new().with_anchors_pem(&fs::read(&roots_path)?)?;

    println!("Verifying {asset_path:?} against {container_path:?}");
    let report = verify(&asset, &container, &trust)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    match report.verdict {
        TrustVerdict::Trusted => println!("verdict: trusted"),
        TrustVerdict::Indeterminate => println!("verdict: indeterminate"),
        TrustVerdict::NotTrusted => {
            println!("verdict: not trusted");
            std::process::exit(1);
        }
    }

    Ok(())
}
