//! Hash algorithms and range-aware digest helpers
//!
//! Hard bindings digest an asset with the embedded-credential region
//! excluded, so the digest helpers here operate over byte ranges as well
//! as whole buffers.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Get the algorithm label used in claims and assertions
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(Error::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(alg: HashAlgorithm) -> String {
        alg.as_str().to_string()
    }
}

/// A contiguous byte range, used for hard-binding exclusion zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub length: u64,
}

impl ByteRange {
    pub fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    /// End offset, when `start + length` does not overflow.
    ///
    /// Ranges arrive from decoded assertions, so the sum cannot be
    /// assumed to fit.
    pub fn checked_end(&self) -> Option<u64> {
        self.start.checked_add(self.length)
    }
}

/// Digest `data` with the given algorithm
pub fn hash_bytes(alg: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match alg {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Digest `data` with the bytes covered by `exclusions` skipped.
///
/// Exclusion ranges must lie within `data` and must not overlap once
/// sorted by start offset. The ranges are excluded from the digest input
/// entirely, so an asset hashed this way is insensitive to whatever sits
/// inside them (typically the embedded credential itself).
pub fn hash_with_exclusions(
    alg: HashAlgorithm,
    data: &[u8],
    exclusions: &[ByteRange],
) -> Result<Vec<u8>> {
    let data_len = data.len() as u64;

    let mut ranges: Vec<ByteRange> = exclusions.to_vec();
    ranges.sort_by_key(|r| r.start);

    // Every range must fit without overflow, lie inside the data and
    // not overlap its predecessor before anything is hashed.
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    let mut cursor: u64 = 0;
    for range in &ranges {
        let end = range
            .checked_end()
            .filter(|&end| end <= data_len)
            .ok_or(Error::RangeOutOfBounds {
                start: range.start,
                length: range.length,
                data_len,
            })?;
        if range.start < cursor {
            return Err(Error::RangeOverlap(range.start));
        }
        cursor = end;
        spans.push((range.start as usize, end as usize));
    }

    fn fold<D: Digest>(data: &[u8], spans: &[(usize, usize)]) -> Vec<u8> {
        let mut hasher = D::new();
        let mut pos: usize = 0;
        for &(start, end) in spans {
            if start > pos {
                hasher.update(&data[pos..start]);
            }
            pos = end;
        }
        if pos < data.len() {
            hasher.update(&data[pos..]);
        }
        hasher.finalize().to_vec()
    }

    Ok(match alg {
        HashAlgorithm::Sha256 => fold::<Sha256>(data, &spans),
        HashAlgorithm::Sha384 => fold::<Sha384>(data, &spans),
        HashAlgorithm::Sha512 => fold::<Sha512>(data, &spans),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_labels_round_trip() {
        for alg in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            assert_eq!(alg.as_str().parse::<HashAlgorithm>().unwrap(), alg);
        }
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_digest_lengths() {
        let data = b"hello world";
        assert_eq!(hash_bytes(HashAlgorithm::Sha256, data).len(), 32);
        assert_eq!(hash_bytes(HashAlgorithm::Sha384, data).len(), 48);
        assert_eq!(hash_bytes(HashAlgorithm::Sha512, data).len(), 64);
    }

    #[test]
    fn test_exclusions_skip_ranges() {
        let data = b"aaaaXXXXbbbb";
        let excluded = hash_with_exclusions(
            HashAlgorithm::Sha256,
            data,
            &[ByteRange::new(4, 4)],
        )
        .unwrap();
        // Hashing with the middle excluded equals hashing the outer parts only.
        assert_eq!(excluded, hash_bytes(HashAlgorithm::Sha256, b"aaaabbbb"));

        // Different bytes inside the exclusion zone do not change the digest.
        let data2 = b"aaaaYYYYbbbb";
        let excluded2 = hash_with_exclusions(
            HashAlgorithm::Sha256,
            data2,
            &[ByteRange::new(4, 4)],
        )
        .unwrap();
        assert_eq!(excluded, excluded2);
    }

    #[test]
    fn test_exclusions_unsorted_input_accepted() {
        let data = b"0123456789";
        let a = hash_with_exclusions(
            HashAlgorithm::Sha256,
            data,
            &[ByteRange::new(6, 2), ByteRange::new(1, 2)],
        )
        .unwrap();
        let b = hash_with_exclusions(
            HashAlgorithm::Sha256,
            data,
            &[ByteRange::new(1, 2), ByteRange::new(6, 2)],
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exclusion_out_of_bounds() {
        let err = hash_with_exclusions(
            HashAlgorithm::Sha256,
            b"short",
            &[ByteRange::new(3, 10)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::RangeOutOfBounds { .. }));
    }

    #[test]
    fn test_exclusion_length_overflow_rejected() {
        let err = hash_with_exclusions(
            HashAlgorithm::Sha256,
            b"data",
            &[ByteRange::new(u64::MAX, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::RangeOutOfBounds { .. }));
        assert_eq!(ByteRange::new(u64::MAX, 1).checked_end(), None);
    }

    #[test]
    fn test_exclusion_overlap_rejected() {
        let err = hash_with_exclusions(
            HashAlgorithm::Sha256,
            b"0123456789",
            &[ByteRange::new(0, 5), ByteRange::new(4, 2)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::RangeOverlap(4)));
    }
}
