//! Signed data items (ANS-104).
//!
//! A data item is the unit the ledger's bundling services accept: content and
//! tags wrapped in a signature by the uploader's key. Arweave RSA (signature
//! type 1) and Ed25519 (signature type 2) keys are supported.
//!
//! Binary layout:
//!
//! ```text
//! sig_type   u16 LE
//! signature  [u8; 512] (type 1) | [u8; 64] (type 2)
//! owner      [u8; 512] (type 1) | [u8; 32] (type 2)
//! target     0x00 | 0x01 [u8; 32]
//! anchor     0x00 | 0x01 [u8; 32]
//! tag_count  u64 LE
//! tag_len    u64 LE
//! tags       Avro array of { name: bytes, value: bytes }
//! data       remaining bytes
//! ```
//!
//! The signature covers the SHA-384 deep hash of
//! `["dataitem", "1", sig_type, owner, target, anchor, tags, data]`, with
//! `sig_type` in decimal, and the item
//! id is `base64url(sha256(signature))`.

use sha2::{Digest, Sha384};

use crate::crypto::{Keypair, Owner, Signature, SignatureType};
use crate::error::{CoreError, Result};
use crate::tags::UploadTag;
use crate::types::ItemId;

/// Maximum number of tags on one item.
pub const MAX_TAGS: usize = 128;
/// Maximum tag name length in bytes.
pub const MAX_TAG_NAME_LEN: usize = 1024;
/// Maximum tag value length in bytes.
pub const MAX_TAG_VALUE_LEN: usize = 3072;

const FORMAT_VERSION: &[u8] = b"1";

/// A signed data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    signature: Signature,
    owner: Owner,
    target: Option<[u8; 32]>,
    anchor: Option<[u8; 32]>,
    tags: Vec<UploadTag>,
    data: Vec<u8>,
}

impl DataItem {
    /// The item id: base64url(sha256(signature)).
    pub fn id(&self) -> ItemId {
        ItemId::from_signature(&self.signature)
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn target(&self) -> Option<&[u8; 32]> {
        self.target.as_ref()
    }

    pub fn anchor(&self) -> Option<&[u8; 32]> {
        self.anchor.as_ref()
    }

    pub fn tags(&self) -> &[UploadTag] {
        &self.tags
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Check the signature against the owner.
    pub fn verify(&self) -> Result<()> {
        let tag_bytes = encode_tags(&self.tags)?;
        let message = signing_message(
            &self.owner,
            self.target.as_ref(),
            self.anchor.as_ref(),
            &tag_bytes,
            &self.data,
        );
        self.owner.verify(&message, &self.signature)
    }

    /// Encode to the binary wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let tag_bytes = encode_tags(&self.tags)?;

        let kind = self.owner.signature_type();
        let mut buf = Vec::with_capacity(
            2 + kind.signature_len()
                + kind.owner_len()
                + 66
                + 16
                + tag_bytes.len()
                + self.data.len(),
        );
        buf.extend_from_slice(&kind.code().to_le_bytes());
        buf.extend_from_slice(self.signature.as_bytes());
        buf.extend_from_slice(self.owner.as_bytes());
        write_optional(&mut buf, self.target.as_ref());
        write_optional(&mut buf, self.anchor.as_ref());
        buf.extend_from_slice(&(self.tags.len() as u64).to_le_bytes());
        buf.extend_from_slice(&(tag_bytes.len() as u64).to_le_bytes());
        buf.extend_from_slice(&tag_bytes);
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    /// Decode from the binary wire form. The signature is not checked;
    /// call [`verify`](Self::verify) for that.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader { bytes, pos: 0 };

        let kind = SignatureType::from_code(u16::from_le_bytes(reader.array::<2>()?))?;
        let signature = Signature::from_bytes(reader.take(kind.signature_len())?);
        let owner = Owner::new(kind, reader.take(kind.owner_len())?.to_vec())?;
        let target = reader.optional()?;
        let anchor = reader.optional()?;
        let tag_count = u64::from_le_bytes(reader.array::<8>()?);
        let tag_len = u64::from_le_bytes(reader.array::<8>()?);
        let tag_len = usize::try_from(tag_len)
            .map_err(|_| CoreError::MalformedDataItem("tag length overflow".into()))?;
        let tags = decode_tags(reader.take(tag_len)?)?;

        if tags.len() as u64 != tag_count {
            return Err(CoreError::MalformedDataItem(format!(
                "header declares {tag_count} tags, found {}",
                tags.len()
            )));
        }

        Ok(Self {
            signature,
            owner,
            target,
            anchor,
            tags,
            data: reader.rest().to_vec(),
        })
    }
}

/// Builder for signed data items.
#[derive(Debug, Clone, Default)]
pub struct DataItemBuilder {
    data: Vec<u8>,
    tags: Vec<UploadTag>,
    target: Option<[u8; 32]>,
    anchor: Option<[u8; 32]>,
}

impl DataItemBuilder {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    pub fn tags<I: IntoIterator<Item = UploadTag>>(mut self, tags: I) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Address the item to a process or wallet.
    pub fn target(mut self, target: [u8; 32]) -> Self {
        self.target = Some(target);
        self
    }

    pub fn anchor(mut self, anchor: [u8; 32]) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Validate the tags and sign.
    pub fn sign(self, keypair: &Keypair) -> Result<DataItem> {
        let tag_bytes = encode_tags(&self.tags)?;
        let owner = keypair.owner();
        let message = signing_message(
            &owner,
            self.target.as_ref(),
            self.anchor.as_ref(),
            &tag_bytes,
            &self.data,
        );

        Ok(DataItem {
            signature: keypair.sign(&message)?,
            owner,
            target: self.target,
            anchor: self.anchor,
            tags: self.tags,
            data: self.data,
        })
    }
}

fn signing_message(
    owner: &Owner,
    target: Option<&[u8; 32]>,
    anchor: Option<&[u8; 32]>,
    tag_bytes: &[u8],
    data: &[u8],
) -> [u8; 48] {
    let sig_type = owner.signature_type().code().to_string();
    deep_hash_list(&[
        b"dataitem".as_slice(),
        FORMAT_VERSION,
        sig_type.as_bytes(),
        owner.as_bytes(),
        target.map(|t| t.as_slice()).unwrap_or_default(),
        anchor.map(|a| a.as_slice()).unwrap_or_default(),
        tag_bytes,
        data,
    ])
}

fn write_optional(buf: &mut Vec<u8>, value: Option<&[u8; 32]>) {
    match value {
        Some(bytes) => {
            buf.push(1);
            buf.extend_from_slice(bytes);
        }
        None => buf.push(0),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Deep hash
// ─────────────────────────────────────────────────────────────────────────────

fn sha384(parts: &[&[u8]]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 48];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Deep hash of a single blob.
pub fn deep_hash_blob(data: &[u8]) -> [u8; 48] {
    let tag = sha384(&[format!("blob{}", data.len()).as_bytes()]);
    sha384(&[tag.as_slice(), sha384(&[data]).as_slice()])
}

/// Deep hash of a flat list of blobs.
pub fn deep_hash_list(items: &[&[u8]]) -> [u8; 48] {
    let mut acc = sha384(&[format!("list{}", items.len()).as_bytes()]);
    for item in items {
        acc = sha384(&[acc.as_slice(), deep_hash_blob(item).as_slice()]);
    }
    acc
}

// ─────────────────────────────────────────────────────────────────────────────
// Avro tag encoding
// ─────────────────────────────────────────────────────────────────────────────

fn validate_tags(tags: &[UploadTag]) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(CoreError::TagLimit(format!(
            "{} tags, at most {MAX_TAGS} allowed",
            tags.len()
        )));
    }
    for tag in tags {
        if tag.name.is_empty() || tag.value.is_empty() {
            return Err(CoreError::TagLimit(format!(
                "tag {:?} has an empty name or value",
                tag.name
            )));
        }
        if tag.name.len() > MAX_TAG_NAME_LEN {
            return Err(CoreError::TagLimit(format!(
                "tag name {:?} exceeds {MAX_TAG_NAME_LEN} bytes",
                tag.name
            )));
        }
        if tag.value.len() > MAX_TAG_VALUE_LEN {
            return Err(CoreError::TagLimit(format!(
                "value of tag {:?} exceeds {MAX_TAG_VALUE_LEN} bytes",
                tag.name
            )));
        }
    }
    Ok(())
}

/// Encode tags as an Avro array. No tags encode to zero bytes.
pub fn encode_tags(tags: &[UploadTag]) -> Result<Vec<u8>> {
    validate_tags(tags)?;
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let mut buf = Vec::new();
    write_long(&mut buf, tags.len() as i64);
    for tag in tags {
        write_bytes(&mut buf, tag.name.as_bytes());
        write_bytes(&mut buf, tag.value.as_bytes());
    }
    write_long(&mut buf, 0);
    Ok(buf)
}

/// Decode an Avro tag array.
pub fn decode_tags(bytes: &[u8]) -> Result<Vec<UploadTag>> {
    let mut tags = Vec::new();
    if bytes.is_empty() {
        return Ok(tags);
    }

    let mut reader = Reader { bytes, pos: 0 };
    loop {
        let mut count = reader.long()?;
        if count == 0 {
            break;
        }
        if count < 0 {
            // Negative block count is followed by the block's byte size.
            count = count
                .checked_neg()
                .ok_or_else(|| CoreError::MalformedDataItem("bad block count".into()))?;
            reader.long()?;
        }
        for _ in 0..count {
            let name = reader.string()?;
            let value = reader.string()?;
            tags.push(UploadTag { name, value });
            if tags.len() > MAX_TAGS {
                return Err(CoreError::TagLimit(format!(
                    "more than {MAX_TAGS} tags"
                )));
            }
        }
    }

    if reader.pos != bytes.len() {
        return Err(CoreError::MalformedDataItem(
            "trailing bytes after tags".into(),
        ));
    }
    Ok(tags)
}

fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    loop {
        let byte = (z & 0x7f) as u8;
        z >>= 7;
        if z == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_long(buf, bytes.len() as i64);
    buf.extend_from_slice(bytes);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| CoreError::MalformedDataItem("unexpected end of input".into()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn optional(&mut self) -> Result<Option<[u8; 32]>> {
        match self.array::<1>()?[0] {
            0 => Ok(None),
            1 => Ok(Some(self.array::<32>()?)),
            flag => Err(CoreError::MalformedDataItem(format!(
                "invalid presence flag {flag}"
            ))),
        }
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        rest
    }

    fn long(&mut self) -> Result<i64> {
        let mut z: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.array::<1>()?[0];
            z |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 63 {
                return Err(CoreError::MalformedDataItem("varint too long".into()));
            }
        }
        Ok(((z >> 1) as i64) ^ -((z & 1) as i64))
    }

    fn string(&mut self) -> Result<String> {
        let len = usize::try_from(self.long()?)
            .map_err(|_| CoreError::MalformedDataItem("negative length".into()))?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CoreError::MalformedDataItem("tag is not UTF-8".into()))
    }
}
