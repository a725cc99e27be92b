//! # mdprov Core
//!
//! Pure primitives for markdown provenance: content identifiers, upload tags,
//! signed data items, and the records kept about completed uploads.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over content and cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`ContentId`] - IPFS-compatible CIDv1 (raw codec, sha2-256) of content bytes
//! - [`TagSet`] - Ordered upload tags with a single canonical `IPFS-CID` tag
//! - [`DataItem`] - An ANS-104 signed envelope around content and tags
//! - [`Keypair`] - Signing credential: an Arweave RSA wallet or an Ed25519 key
//! - [`LedgerRecord`] - One locally recorded upload
//! - [`UploadResult`] - Outcome of an upload attempt
//!
//! ## Encoding
//!
//! Data items are encoded exactly as the ledger's bundling format expects.
//! See the [`dataitem`] module.

pub mod cid;
pub mod crypto;
pub mod dataitem;
pub mod error;
pub mod record;
pub mod tags;
pub mod types;

pub use cid::ContentId;
pub use crypto::{Jwk, Keypair, Owner, Signature, SignatureType};
pub use dataitem::{DataItem, DataItemBuilder};
pub use error::{CoreError, Result};
pub use record::{IndexVersion, LedgerRecord};
pub use tags::{TagSet, UploadTag, CONTENT_ID_TAG};
pub use types::{
    gateway_url, viewblock_url, DedupSource, ItemId, Origin, UploadResult, PUBLIC_EXPLORER,
    PUBLIC_GATEWAY,
};
