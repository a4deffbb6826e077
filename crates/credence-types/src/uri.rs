//! Hashed-URI references and manifest URI helpers
//!
//! Claims reference assertions, signatures and ingredient manifests by
//! URI plus a digest of the referenced bytes. The URI scheme is the
//! self-referential `self#jumbf=` form pointing into the box container.

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};

/// Prefix for self-referential container URIs
pub const SELF_URI_PREFIX: &str = "self#jumbf=";

/// Top-level store label inside container URIs
pub const STORE_LABEL: &str = "credence";

/// A URI paired with the digest of the bytes it refers to.
///
/// The digest algorithm is optional; when absent the claim's default
/// algorithm applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedUri {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<HashAlgorithm>,
    #[serde(with = "serde_bytes")]
    pub hash: Vec<u8>,
}

impl HashedUri {
    pub fn new(url: String, alg: Option<HashAlgorithm>, hash: Vec<u8>) -> Self {
        Self { url, alg, hash }
    }
}

/// Build the URI of a manifest inside the store
pub fn manifest_uri(manifest_label: &str) -> String {
    format!("{SELF_URI_PREFIX}/{STORE_LABEL}/{manifest_label}")
}

/// Build the URI of an assertion inside a manifest
pub fn assertion_uri(manifest_label: &str, assertion_label: &str) -> String {
    format!("{SELF_URI_PREFIX}/{STORE_LABEL}/{manifest_label}/{STORE_LABEL}.assertions/{assertion_label}")
}

/// Build the URI of a manifest's signature box
pub fn signature_uri(manifest_label: &str) -> String {
    format!("{SELF_URI_PREFIX}/{STORE_LABEL}/{manifest_label}/{STORE_LABEL}.signature")
}

/// Extract the manifest label from a manifest or manifest-relative URI
pub fn manifest_label_from_uri(uri: &str) -> Result<String> {
    let path = uri
        .strip_prefix(SELF_URI_PREFIX)
        .ok_or_else(|| Error::InvalidUri(uri.to_string()))?;
    let mut parts = path.split('/').filter(|p| !p.is_empty());

    match (parts.next(), parts.next()) {
        (Some(STORE_LABEL), Some(label)) if !label.is_empty() => Ok(label.to_string()),
        _ => Err(Error::InvalidUri(uri.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_uri_round_trip() {
        let uri = manifest_uri("urn:credence:abc123");
        assert_eq!(uri, "self#jumbf=/credence/urn:credence:abc123");
        assert_eq!(manifest_label_from_uri(&uri).unwrap(), "urn:credence:abc123");
    }

    #[test]
    fn test_label_from_assertion_uri() {
        let uri = assertion_uri("urn:credence:abc123", "credence.hash.data");
        assert_eq!(manifest_label_from_uri(&uri).unwrap(), "urn:credence:abc123");
    }

    #[test]
    fn test_invalid_uris_rejected() {
        assert!(manifest_label_from_uri("https://example.com/m1").is_err());
        assert!(manifest_label_from_uri("self#jumbf=/other/m1").is_err());
        assert!(manifest_label_from_uri("self#jumbf=/credence/").is_err());
    }
}
