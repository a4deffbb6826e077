//! Box container parser
//!
//! Walks the length-prefixed box structure and produces a tree of spans
//! into the input buffer. No payload bytes are copied; description boxes
//! are the only payloads interpreted here.

use crate::error::{Error, Result};
use crate::{BOX_TYPE_DESC, BOX_TYPE_SUPER};
use std::fmt;
use std::ops::Range;

/// A 4-byte box type tag
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxType(pub [u8; 4]);

impl fmt::Debug for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxType({self})")
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// One parsed box: its type, where it sits in the buffer, and its
/// children when it is a superbox.
#[derive(Debug, Clone)]
pub struct BoxSpan {
    pub box_type: BoxType,
    /// Offset of the box header in the buffer
    pub offset: usize,
    /// Payload bytes (header excluded)
    pub payload: Range<usize>,
    /// Child boxes; non-empty only for superboxes
    pub children: Vec<BoxSpan>,
}

impl BoxSpan {
    pub fn payload_bytes<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.payload.clone()]
    }

    pub fn is_superbox(&self) -> bool {
        self.box_type == BOX_TYPE_SUPER
    }
}

/// Decode a buffer holding exactly one top-level box.
///
/// Trailing bytes after the root box are a structural violation; so is
/// any declared length that does not fit the remaining buffer.
pub fn decode(buf: &[u8]) -> Result<BoxSpan> {
    if buf.is_empty() {
        return Err(Error::malformed(0, "empty buffer"));
    }
    let root = parse_box(buf, 0, buf.len())?;
    let end = root.payload.end;
    if end != buf.len() {
        return Err(Error::malformed(end, "trailing bytes after top-level box"));
    }
    Ok(root)
}

fn parse_box(buf: &[u8], offset: usize, limit: usize) -> Result<BoxSpan> {
    if limit - offset < 8 {
        return Err(Error::malformed(offset, "truncated box header"));
    }

    let size32 = u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap_or([0; 4]));
    let box_type = BoxType(buf[offset + 4..offset + 8].try_into().unwrap_or([0; 4]));

    let (total_len, header_len) = match size32 {
        0 => return Err(Error::malformed(offset, "zero-length box")),
        1 => {
            if limit - offset < 16 {
                return Err(Error::malformed(offset, "truncated extended length"));
            }
            let size64 =
                u64::from_be_bytes(buf[offset + 8..offset + 16].try_into().unwrap_or([0; 8]));
            (size64, 16usize)
        }
        n => (n as u64, 8usize),
    };

    if total_len < header_len as u64 {
        return Err(Error::malformed(offset, "declared length smaller than header"));
    }
    let remaining = (limit - offset) as u64;
    if total_len > remaining {
        return Err(Error::malformed(
            offset,
            format!("declared length {total_len} exceeds remaining {remaining} bytes"),
        ));
    }

    let payload_start = offset + header_len;
    let payload_end = offset + total_len as usize;

    let children = if box_type == BOX_TYPE_SUPER {
        parse_children(buf, payload_start, payload_end)?
    } else {
        Vec::new()
    };

    Ok(BoxSpan {
        box_type,
        offset,
        payload: payload_start..payload_end,
        children,
    })
}

fn parse_children(buf: &[u8], start: usize, end: usize) -> Result<Vec<BoxSpan>> {
    let mut children = Vec::new();
    let mut pos = start;
    while pos < end {
        if end - pos < 8 {
            // A child cannot overrun its parent's declared extent.
            return Err(Error::malformed(pos, "superbox children overrun parent"));
        }
        let child = parse_box(buf, pos, end)?;
        pos = child.payload.end;
        children.push(child);
    }
    Ok(children)
}

/// Interpreted description box contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub uuid: [u8; 16],
    pub requestable: bool,
    pub label: Option<String>,
}

const TOGGLE_REQUESTABLE: u8 = 0x01;
const TOGGLE_LABEL: u8 = 0x02;

impl Description {
    fn from_span(buf: &[u8], span: &BoxSpan) -> Result<Self> {
        let payload = span.payload_bytes(buf);
        if payload.len() < 17 {
            return Err(Error::InvalidDescription {
                offset: span.offset,
                reason: "payload shorter than uuid + toggles".to_string(),
            });
        }

        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(&payload[..16]);
        let toggles = payload[16];

        let label = if toggles & TOGGLE_LABEL != 0 {
            let rest = &payload[17..];
            let nul = rest.iter().position(|&b| b == 0).ok_or_else(|| {
                Error::InvalidDescription {
                    offset: span.offset,
                    reason: "label missing NUL terminator".to_string(),
                }
            })?;
            let label = std::str::from_utf8(&rest[..nul]).map_err(|_| {
                Error::InvalidDescription {
                    offset: span.offset,
                    reason: "label is not valid UTF-8".to_string(),
                }
            })?;
            Some(label.to_string())
        } else {
            None
        };

        Ok(Description {
            uuid,
            requestable: toggles & TOGGLE_REQUESTABLE != 0,
            label,
        })
    }
}

/// A superbox together with its interpreted description.
///
/// Wraps a parsed [`BoxSpan`] whose first child is the description box;
/// the remaining children are the superbox's data boxes.
#[derive(Debug)]
pub struct SuperBox<'a> {
    pub span: &'a BoxSpan,
    pub desc: Description,
}

impl<'a> SuperBox<'a> {
    /// Interpret a parsed span as a superbox.
    pub fn from_span(buf: &[u8], span: &'a BoxSpan) -> Result<Self> {
        if !span.is_superbox() {
            return Err(Error::malformed(span.offset, "not a superbox"));
        }
        let desc_span = span
            .children
            .first()
            .filter(|c| c.box_type == BOX_TYPE_DESC)
            .ok_or(Error::MissingDescription(span.offset))?;
        let desc = Description::from_span(buf, desc_span)?;
        Ok(Self { span, desc })
    }

    /// Data boxes: every child after the description box
    pub fn data_boxes(&self) -> &'a [BoxSpan] {
        &self.span.children[1..]
    }

    /// Child superboxes, in container order
    pub fn child_super_boxes(&self, buf: &[u8]) -> Result<Vec<SuperBox<'a>>> {
        self.data_boxes()
            .iter()
            .filter(|c| c.is_superbox())
            .map(|c| SuperBox::from_span(buf, c))
            .collect()
    }

    /// Find the first child superbox whose description carries `label`
    pub fn find_by_label(&self, buf: &[u8], label: &str) -> Option<SuperBox<'a>> {
        self.data_boxes()
            .iter()
            .filter(|c| c.is_superbox())
            .filter_map(|c| SuperBox::from_span(buf, c).ok())
            .find(|sb| sb.desc.label.as_deref() == Some(label))
    }

    /// The raw bytes of the whole superbox including its header.
    ///
    /// This is the region ingredient references digest, so it must be
    /// byte-exact.
    pub fn raw_bytes<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        // The header starts at `offset`; the payload range ends the box.
        &buf[self.span.offset..self.span.payload.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{cbor_box, super_box};
    use crate::labels;

    #[test]
    fn test_decode_simple_superbox() {
        let container = super_box(
            labels::STORE_UUID,
            Some(labels::STORE),
            &[cbor_box(b"\xa0")],
        );
        let root = decode(&container).unwrap();
        assert!(root.is_superbox());
        assert_eq!(root.children.len(), 2); // jumd + cbor

        let sb = SuperBox::from_span(&container, &root).unwrap();
        assert_eq!(&sb.desc.uuid, labels::STORE_UUID);
        assert_eq!(sb.desc.label.as_deref(), Some(labels::STORE));
        assert_eq!(sb.data_boxes().len(), 1);
        assert_eq!(sb.data_boxes()[0].payload_bytes(&container), b"\xa0");
    }

    #[test]
    fn test_zero_length_box_fails() {
        let mut container = super_box(labels::STORE_UUID, Some(labels::STORE), &[]);
        // Forge a zero length in the root header.
        container[0..4].copy_from_slice(&0u32.to_be_bytes());
        let err = decode(&container).unwrap_err();
        assert!(matches!(err, Error::Malformed { offset: 0, .. }));
    }

    #[test]
    fn test_declared_length_beyond_buffer_fails() {
        let mut container = super_box(labels::STORE_UUID, Some(labels::STORE), &[]);
        let too_big = (container.len() + 10) as u32;
        container[0..4].copy_from_slice(&too_big.to_be_bytes());
        let err = decode(&container).unwrap_err();
        assert!(matches!(err, Error::Malformed { offset: 0, .. }));
    }

    #[test]
    fn test_child_overrun_fails() {
        let inner = cbor_box(b"payload");
        let mut container = super_box(labels::STORE_UUID, Some(labels::STORE), &[inner]);
        // Inflate the child's declared length so it overruns the parent.
        let root = decode(&container).unwrap();
        let child_off = root.children[1].offset;
        let bigger = (container.len() - child_off + 8) as u32;
        container[child_off..child_off + 4].copy_from_slice(&bigger.to_be_bytes());
        assert!(decode(&container).is_err());
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let mut container = super_box(labels::STORE_UUID, Some(labels::STORE), &[]);
        container.push(0xff);
        let err = decode(&container).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_truncated_header_fails() {
        assert!(decode(&[0x00, 0x00, 0x00]).is_err());
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_description_requires_nul_terminated_label() {
        // Hand-build a superbox whose jumd has the label toggle set but no NUL.
        let mut desc_payload = Vec::new();
        desc_payload.extend_from_slice(labels::STORE_UUID);
        desc_payload.push(0x03);
        desc_payload.extend_from_slice(b"unterminated");

        let mut desc = Vec::new();
        desc.extend_from_slice(&((8 + desc_payload.len()) as u32).to_be_bytes());
        desc.extend_from_slice(b"jumd");
        desc.extend_from_slice(&desc_payload);

        let mut container = Vec::new();
        container.extend_from_slice(&((8 + desc.len()) as u32).to_be_bytes());
        container.extend_from_slice(b"jumb");
        container.extend_from_slice(&desc);

        let root = decode(&container).unwrap();
        let err = SuperBox::from_span(&container, &root).unwrap_err();
        assert!(matches!(err, Error::InvalidDescription { .. }));
    }
}
