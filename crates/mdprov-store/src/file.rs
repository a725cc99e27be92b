//! File-backed ledgers under the provenance state directory.
//!
//! Layout:
//!
//! ```text
//! <state dir>/
//!   transactions.jsonl     one LedgerRecord per line
//!   index-versions.jsonl   one IndexVersion per line
//!   index-instructions.md  optional prose for the index document
//! ```
//!
//! No lock guards these files against concurrent processes. Two writers
//! appending at once can each miss the other's record during dedup.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mdprov_core::{IndexVersion, LedgerRecord};

use crate::error::Result;
use crate::jsonl::JsonLines;
use crate::traits::{IndexHistory, LocalLedger};

pub const TRANSACTIONS_FILE: &str = "transactions.jsonl";
pub const INDEX_VERSIONS_FILE: &str = "index-versions.jsonl";
pub const INDEX_INSTRUCTIONS_FILE: &str = "index-instructions.md";

/// The provenance state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.root.join(TRANSACTIONS_FILE)
    }

    pub fn index_versions_path(&self) -> PathBuf {
        self.root.join(INDEX_VERSIONS_FILE)
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.root.join(INDEX_INSTRUCTIONS_FILE)
    }

    pub fn ledger(&self) -> JsonlLedger {
        JsonlLedger::open(self.transactions_path())
    }

    pub fn index_history(&self) -> JsonlIndexHistory {
        JsonlIndexHistory::open(self.index_versions_path())
    }

    /// Contents of the optional index instructions file.
    ///
    /// A missing or unreadable file reads as `None`.
    pub async fn instructions(&self) -> Option<String> {
        let path = self.instructions_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read index instructions");
                }
                None
            }
        }
    }
}

/// Transaction ledger stored as JSON Lines.
#[derive(Debug, Clone)]
pub struct JsonlLedger {
    lines: JsonLines<LedgerRecord>,
}

impl JsonlLedger {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            lines: JsonLines::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.lines.path()
    }
}

#[async_trait]
impl LocalLedger for JsonlLedger {
    async fn append(&self, record: &LedgerRecord) -> Result<()> {
        self.lines.append(record).await?;
        tracing::debug!(tx_id = %record.tx_id, cid = %record.cid, "ledger record appended");
        Ok(())
    }

    async fn records(&self) -> Result<Vec<LedgerRecord>> {
        self.lines.read_all().await
    }
}

/// Index version log stored as JSON Lines.
#[derive(Debug, Clone)]
pub struct JsonlIndexHistory {
    lines: JsonLines<IndexVersion>,
}

impl JsonlIndexHistory {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            lines: JsonLines::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.lines.path()
    }
}

#[async_trait]
impl IndexHistory for JsonlIndexHistory {
    async fn append(&self, version: &IndexVersion) -> Result<()> {
        self.lines.append(version).await
    }

    async fn versions(&self) -> Result<Vec<IndexVersion>> {
        self.lines.read_all().await
    }
}
