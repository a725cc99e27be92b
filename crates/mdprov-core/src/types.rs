//! Strong type definitions for mdprov.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cid::ContentId;
use crate::crypto::{b64url_encode, sha256, Signature};

/// Identifier of a submitted item on the ledger.
///
/// For data items this is base64url(sha256(signature)), 43 characters.
/// Ids returned by remote services are kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the id of a data item from its signature.
    pub fn from_signature(signature: &Signature) -> Self {
        Self(b64url_encode(&sha256(signature.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters, for compact tables.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(12).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Public explorer that item links point at.
pub const PUBLIC_EXPLORER: &str = "https://viewblock.io/arweave/tx";
/// Public gateway that item links point at.
///
/// Links are written into the ledger and the published index, so they always
/// use the public gateway, never the one configured for queries and name
/// resolution (which may be local or private).
pub const PUBLIC_GATEWAY: &str = "https://arweave.net";

/// Explorer URL for an item.
pub fn viewblock_url(id: &ItemId) -> String {
    format!("{PUBLIC_EXPLORER}/{id}")
}

/// Public gateway URL for an item. See [`PUBLIC_GATEWAY`].
pub fn gateway_url(id: &ItemId) -> String {
    format!("{PUBLIC_GATEWAY}/{id}")
}

/// Where a previously uploaded item was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupSource {
    /// The local transaction log.
    Local,
    /// The remote ledger's tag index.
    Remote,
}

impl fmt::Display for DedupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupSource::Local => f.write_str("local log"),
            DedupSource::Remote => f.write_str("remote ledger"),
        }
    }
}

/// Whether an upload produced a new item or reused an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    New,
    Existing(DedupSource),
}

/// Outcome of an upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub item_id: ItemId,
    pub viewblock_url: String,
    pub gateway_url: String,
    pub content_id: ContentId,
    pub size: u64,
    pub origin: Origin,
}

impl UploadResult {
    /// Build a result with URLs derived from the item id.
    pub fn new(item_id: ItemId, content_id: ContentId, size: u64, origin: Origin) -> Self {
        Self {
            viewblock_url: viewblock_url(&item_id),
            gateway_url: gateway_url(&item_id),
            item_id,
            content_id,
            size,
            origin,
        }
    }

    pub fn already_exists(&self) -> bool {
        matches!(self.origin, Origin::Existing(_))
    }

    /// The source that resolved an existing item.
    pub fn source(&self) -> Option<DedupSource> {
        match self.origin {
            Origin::New => None,
            Origin::Existing(source) => Some(source),
        }
    }
}
