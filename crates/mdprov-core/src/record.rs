//! Records kept about completed uploads.
//!
//! Field names on the wire match the transaction log format already in use
//! (`txId`, `cid`, ...), so existing logs stay readable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cid::ContentId;
use crate::types::{gateway_url, ItemId, UploadResult};

/// One completed upload, as persisted in the local ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub timestamp: DateTime<Utc>,
    /// Original file or display name.
    pub file: String,
    #[serde(rename = "txId")]
    pub tx_id: ItemId,
    /// Explorer URL of the item.
    pub url: String,
    pub cid: ContentId,
    pub size: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl LedgerRecord {
    /// Record the given upload result.
    pub fn from_result(
        result: &UploadResult,
        file: impl Into<String>,
        tags: BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            file: file.into(),
            tx_id: result.item_id.clone(),
            url: result.viewblock_url.clone(),
            cid: result.content_id,
            size: result.size,
            tags,
        }
    }

    /// Direct gateway URL of the recorded item.
    pub fn gateway_url(&self) -> String {
        gateway_url(&self.tx_id)
    }
}

/// One published index document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexVersion {
    pub timestamp: DateTime<Utc>,
    pub tx_id: ItemId,
    pub arweave_url: String,
    pub ipfs_cid: ContentId,
    pub size: u64,
    /// Number of ledger records summarised by this version.
    pub transaction_count: usize,
}

impl IndexVersion {
    pub fn from_result(
        result: &UploadResult,
        transaction_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            tx_id: result.item_id.clone(),
            arweave_url: result.gateway_url.clone(),
            ipfs_cid: result.content_id,
            size: result.size,
            transaction_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;

    #[test]
    fn test_reads_existing_log_line() {
        let line = r#"{"timestamp":"2025-01-20T10:15:30.123Z","file":"essay.md","txId":"abcDEF123","url":"https://viewblock.io/arweave/tx/abcDEF123","cid":"bafkreiabzdpejycnf55dat2qsy2ulivp6wgdh2oejipth7ols6h3ejgloq","size":7}"#;
        let record: LedgerRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.file, "essay.md");
        assert_eq!(record.tx_id.as_str(), "abcDEF123");
        assert_eq!(record.cid, ContentId::identify(b"# Hello"));
        assert_eq!(record.size, 7);
        assert!(record.tags.is_empty());
        assert_eq!(record.gateway_url(), "https://arweave.net/abcDEF123");
    }

    #[test]
    fn test_serializes_wire_names() {
        let result = UploadResult::new(
            ItemId::new("tx1"),
            ContentId::identify(b"a"),
            1,
            Origin::New,
        );
        let mut tags = BTreeMap::new();
        tags.insert("Author".to_string(), "Ada".to_string());
        let record = LedgerRecord::from_result(&result, "a.md", tags, Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["txId"], "tx1");
        assert_eq!(json["url"], "https://viewblock.io/arweave/tx/tx1");
        assert_eq!(json["tags"]["Author"], "Ada");

        let untagged = LedgerRecord { tags: BTreeMap::new(), ..record };
        let json = serde_json::to_value(&untagged).unwrap();
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_index_version_wire_names() {
        let result = UploadResult::new(
            ItemId::new("idx1"),
            ContentId::identify(b"index"),
            5,
            Origin::New,
        );
        let version = IndexVersion::from_result(&result, 3, Utc::now());
        let json = serde_json::to_value(&version).unwrap();
        assert_eq!(json["txId"], "idx1");
        assert_eq!(json["arweaveUrl"], "https://arweave.net/idx1");
        assert_eq!(json["transactionCount"], 3);
    }
}
