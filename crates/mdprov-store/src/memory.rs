//! In-memory implementations of the ledger traits.
//!
//! These are primarily for testing. They have the same semantics as the
//! JSON Lines ledgers but keep everything in memory with no persistence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mdprov_core::{IndexVersion, LedgerRecord};

use crate::error::{Result, StoreError};
use crate::traits::{IndexHistory, LocalLedger};

/// In-memory transaction ledger.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
/// Appends can be switched to fail, to exercise callers' error paths.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<LedgerRecord>>,
    fail_appends: AtomicBool,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that already holds the given records.
    pub fn with_records(records: Vec<LedgerRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            fail_appends: AtomicBool::new(false),
        }
    }

    /// Make every subsequent append fail (or succeed again).
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<LedgerRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<LedgerRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LocalLedger for MemoryLedger {
    async fn append(&self, record: &LedgerRecord) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("memory ledger is read-only".into()));
        }
        self.write().push(record.clone());
        Ok(())
    }

    async fn records(&self) -> Result<Vec<LedgerRecord>> {
        Ok(self.read().clone())
    }
}

/// In-memory index version log.
#[derive(Debug, Default)]
pub struct MemoryIndexHistory {
    versions: RwLock<Vec<IndexVersion>>,
    fail_appends: AtomicBool,
}

impl MemoryIndexHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IndexHistory for MemoryIndexHistory {
    async fn append(&self, version: &IndexVersion) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("index history is read-only".into()));
        }
        self.versions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(version.clone());
        Ok(())
    }

    async fn versions(&self) -> Result<Vec<IndexVersion>> {
        Ok(self
            .versions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}
