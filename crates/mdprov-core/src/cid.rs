//! Content identifiers.
//!
//! A [`ContentId`] is a CIDv1 over the raw bytes of a document:
//!
//! ```text
//! "b" + base32lower(0x01 || 0x55 || 0x12 || 0x20 || sha256(content))
//!       version  raw codec  sha2-256  digest length
//! ```
//!
//! This is the same identifier IPFS assigns to a single-block raw file, so
//! ids computed here can be compared byte-for-byte with ids computed anywhere
//! else.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// CID version byte.
pub const CID_VERSION: u8 = 0x01;
/// Multicodec code for raw binary.
pub const RAW_CODEC: u8 = 0x55;
/// Multihash code for sha2-256.
pub const SHA2_256: u8 = 0x12;
/// Digest length in bytes.
pub const DIGEST_LEN: u8 = 0x20;

/// Multibase prefix for base32 lowercase, no padding.
const MULTIBASE_BASE32: char = 'b';

const HEADER: [u8; 4] = [CID_VERSION, RAW_CODEC, SHA2_256, DIGEST_LEN];

/// A content identifier: CIDv1, raw codec, sha2-256.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId([u8; 32]);

impl ContentId {
    /// Compute the identifier of the given content.
    pub fn identify(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hasher.finalize().into())
    }

    /// Create from a raw sha2-256 digest.
    pub const fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    /// Get the sha2-256 digest.
    pub const fn digest(&self) -> &[u8; 32] {
        &self.0
    }

    /// Binary CID: header followed by the digest.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(36);
        bytes.extend_from_slice(&HEADER);
        bytes.extend_from_slice(&self.0);
        bytes
    }

    /// Digest as hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", MULTIBASE_BASE32, base32_encode(&self.to_bytes()))
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self)
    }
}

impl FromStr for ContentId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(MULTIBASE_BASE32)
            .ok_or_else(|| CoreError::InvalidCid(format!("unsupported multibase in {s:?}")))?;

        let bytes = base32_decode(body)
            .ok_or_else(|| CoreError::InvalidCid(format!("invalid base32 in {s:?}")))?;

        if bytes.len() != HEADER.len() + 32 {
            return Err(CoreError::InvalidCid(format!(
                "expected 36 bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[..HEADER.len()] != HEADER {
            return Err(CoreError::InvalidCid(
                "not a CIDv1 raw sha2-256 identifier".into(),
            ));
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[HEADER.len()..]);
        Ok(Self(digest))
    }
}

impl TryFrom<String> for ContentId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ContentId> for String {
    fn from(cid: ContentId) -> Self {
        cid.to_string()
    }
}

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

// RFC 4648 Base32 encoding (lowercase, no padding)
fn base32_encode(data: &[u8]) -> String {
    let mut result = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in data {
        buffer = (buffer << 8) | (byte as u64);
        bits_in_buffer += 8;

        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let index = ((buffer >> bits_in_buffer) & 0x1f) as usize;
            result.push(ALPHABET[index] as char);
        }
    }

    if bits_in_buffer > 0 {
        let index = ((buffer << (5 - bits_in_buffer)) & 0x1f) as usize;
        result.push(ALPHABET[index] as char);
    }

    result
}

fn base32_decode(s: &str) -> Option<Vec<u8>> {
    let mut result = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for c in s.bytes() {
        let value = ALPHABET.iter().position(|&a| a == c)? as u64;
        buffer = (buffer << 5) | value;
        bits_in_buffer += 5;

        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result.push(((buffer >> bits_in_buffer) & 0xff) as u8);
        }
    }

    // Leftover bits are padding and must be zero.
    if buffer & ((1 << bits_in_buffer) - 1) != 0 {
        return None;
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            ContentId::identify(b"").to_string(),
            "bafkreihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku"
        );
        assert_eq!(
            ContentId::identify(b"hello world").to_string(),
            "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e"
        );
        assert_eq!(
            ContentId::identify(b"# Hello").to_string(),
            "bafkreiabzdpejycnf55dat2qsy2ulivp6wgdh2oejipth7ols6h3ejgloq"
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        let cid = ContentId::identify(b"# Hello\n");
        let parsed: ContentId = cid.to_string().parse().unwrap();
        assert_eq!(cid, parsed);
    }

    #[test]
    fn test_parse_rejects_other_codecs() {
        // CIDv0 (base58 "Qm...") is not accepted.
        assert!("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
            .parse::<ContentId>()
            .is_err());
        // dag-cbor codec instead of raw.
        let mut bytes = vec![0x01, 0x71, 0x12, 0x20];
        bytes.extend_from_slice(&[0u8; 32]);
        let s = format!("b{}", base32_encode(&bytes));
        assert!(s.parse::<ContentId>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let cid = ContentId::identify(b"x");
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, format!("\"{}\"", cid));
        let back: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cid);
        assert!(serde_json::from_str::<ContentId>("\"bogus\"").is_err());
    }

    #[test]
    fn test_base32_encode() {
        // Test vector from RFC 4648
        assert_eq!(base32_encode(b""), "");
        assert_eq!(base32_encode(b"f"), "my");
        assert_eq!(base32_encode(b"fo"), "mzxq");
        assert_eq!(base32_encode(b"foo"), "mzxw6");
        assert_eq!(base32_encode(b"foob"), "mzxw6yq");
        assert_eq!(base32_encode(b"fooba"), "mzxw6ytb");
        assert_eq!(base32_encode(b"foobar"), "mzxw6ytboi");
    }

    #[test]
    fn test_base32_decode() {
        assert_eq!(base32_decode("mzxw6ytboi").unwrap(), b"foobar");
        assert_eq!(base32_decode("my").unwrap(), b"f");
        assert!(base32_decode("MZXW6").is_none());
        assert!(base32_decode("mz").is_none());
    }
}
