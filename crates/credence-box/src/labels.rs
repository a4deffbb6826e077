//! Container UUIDs and box labels
//!
//! Every superbox in a manifest store is tagged with one of these UUIDs
//! in its description box; the labels name the standard boxes inside a
//! manifest.

use hex_literal::hex;

/// UUID of the top-level manifest store superbox
pub const STORE_UUID: &[u8; 16] = &hex!("63726564 0011 0010 8000 00aa00389b71");

/// UUID of a manifest superbox
pub const MANIFEST_UUID: &[u8; 16] = &hex!("63326d61 0011 0010 8000 00aa00389b71");

/// UUID of the assertion-store superbox inside a manifest
pub const ASSERTION_STORE_UUID: &[u8; 16] = &hex!("63326173 0011 0010 8000 00aa00389b71");

/// UUID of the claim superbox inside a manifest
pub const CLAIM_UUID: &[u8; 16] = &hex!("6332636c 0011 0010 8000 00aa00389b71");

/// UUID of the signature superbox inside a manifest
pub const SIGNATURE_UUID: &[u8; 16] = &hex!("63327369 0011 0010 8000 00aa00389b71");

/// UUID of a plain CBOR content superbox (assertions)
pub const CBOR_ASSERTION_UUID: &[u8; 16] = &hex!("63626f72 0011 0010 8000 00aa00389b71");

/// Label of the top-level store superbox
pub const STORE: &str = "credence";

/// Label of the assertion store within a manifest
pub const ASSERTIONS: &str = "credence.assertions";

/// Label of the claim box within a manifest
pub const CLAIM: &str = "credence.claim";

/// Label of the signature box within a manifest
pub const SIGNATURE: &str = "credence.signature";
