//! Box container writer
//!
//! Mirror image of the parser, used by the signing path to emit
//! container bytes. Output is deterministic: the compact 4-byte length
//! form is used unless a payload genuinely needs the extended form.

use crate::{BOX_TYPE_CBOR, BOX_TYPE_DESC, BOX_TYPE_SUPER};

fn write_box(out: &mut Vec<u8>, box_type: [u8; 4], payload: &[u8]) {
    let len = payload.len() as u64;
    if len + 8 <= u32::MAX as u64 {
        out.extend_from_slice(&((len + 8) as u32).to_be_bytes());
        out.extend_from_slice(&box_type);
    } else {
        out.extend_from_slice(&1u32.to_be_bytes());
        out.extend_from_slice(&box_type);
        out.extend_from_slice(&(len + 16).to_be_bytes());
    }
    out.extend_from_slice(payload);
}

fn desc_box(uuid: &[u8; 16], label: Option<&str>) -> Vec<u8> {
    let mut payload = Vec::with_capacity(17 + label.map_or(0, |l| l.len() + 1));
    payload.extend_from_slice(uuid);
    match label {
        Some(label) => {
            payload.push(0x03); // requestable + label present
            payload.extend_from_slice(label.as_bytes());
            payload.push(0);
        }
        None => payload.push(0x01),
    }

    let mut out = Vec::new();
    write_box(&mut out, BOX_TYPE_DESC.0, &payload);
    out
}

/// Build a superbox from a description and already-serialized child boxes
pub fn super_box(uuid: &[u8; 16], label: Option<&str>, children: &[Vec<u8>]) -> Vec<u8> {
    let desc = desc_box(uuid, label);
    let payload_len = desc.len() + children.iter().map(Vec::len).sum::<usize>();

    let mut payload = Vec::with_capacity(payload_len);
    payload.extend_from_slice(&desc);
    for child in children {
        payload.extend_from_slice(child);
    }

    let mut out = Vec::with_capacity(payload_len + 8);
    write_box(&mut out, BOX_TYPE_SUPER.0, &payload);
    out
}

/// Build a CBOR content box around an already-encoded payload
pub fn cbor_box(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 8);
    write_box(&mut out, BOX_TYPE_CBOR.0, payload);
    out
}
