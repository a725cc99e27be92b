//! Ledger traits: the abstract interface for local provenance state.
//!
//! These traits let the service stay storage-agnostic. Implementations
//! include JSON Lines files (primary) and in-memory (for tests).

use async_trait::async_trait;
use mdprov_core::{ContentId, IndexVersion, LedgerRecord};

use crate::error::Result;

/// Append-only log of completed uploads.
///
/// Records are never mutated or removed once appended. Readers tolerate
/// corrupt entries by skipping them.
#[async_trait]
pub trait LocalLedger: Send + Sync {
    /// Durably append one record.
    async fn append(&self, record: &LedgerRecord) -> Result<()>;

    /// All readable records, in append order.
    async fn records(&self) -> Result<Vec<LedgerRecord>>;

    /// The most recently appended record for the given content id.
    async fn find_by_content_id(&self, cid: &ContentId) -> Result<Option<LedgerRecord>> {
        let records = self.records().await?;
        Ok(records.into_iter().rev().find(|r| r.cid == *cid))
    }
}

/// Append-only log of published index documents.
#[async_trait]
pub trait IndexHistory: Send + Sync {
    async fn append(&self, version: &IndexVersion) -> Result<()>;

    /// All readable versions, oldest first.
    async fn versions(&self) -> Result<Vec<IndexVersion>>;

    /// The most recently published version.
    async fn latest(&self) -> Result<Option<IndexVersion>> {
        Ok(self.versions().await?.pop())
    }
}
