//! Transport abstraction for remote ledger services.
//!
//! Three seams: querying items by tag, posting signed items, and resolving
//! registered names. Implementations may use HTTP or anything else; the
//! [`memory`] module simulates all three in-process.

use async_trait::async_trait;
use bytes::Bytes;
use mdprov_core::{ItemId, UploadTag};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An item returned by a tag query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedItem {
    pub id: ItemId,
    pub tags: Vec<UploadTag>,
}

impl TaggedItem {
    /// Whether the item carries a tag with exactly this name and value.
    pub fn has_tag(&self, name: &str, value: &str) -> bool {
        self.tags.iter().any(|t| t.name == name && t.value == value)
    }
}

/// Registration record of a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameRecord {
    /// Process that owns the name and accepts record updates.
    pub process_id: String,
    /// Item the name currently points at.
    #[serde(default)]
    pub tx_id: Option<String>,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
}

/// Query items by tag.
#[async_trait]
pub trait TagQuery: Send + Sync {
    /// Up to `first` items carrying tag `name` with value `value`.
    async fn find_by_tag(&self, name: &str, value: &str, first: u32) -> Result<Vec<TaggedItem>>;
}

/// Accept signed data items.
#[async_trait]
pub trait Ingest: Send + Sync {
    /// Post the raw bytes of a signed data item; returns the id the
    /// service assigned.
    async fn post_item(&self, item: Bytes) -> Result<ItemId>;
}

/// Resolve registered names.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Fails with `NetError::NameNotRegistered` for unknown names.
    async fn resolve(&self, name: &str) -> Result<NameRecord>;
}

/// A simple in-memory ledger for testing.
///
/// Posted items are decoded, verified and, by default, made visible to tag
/// queries. Failures and stalls can be switched on per seam.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use mdprov_core::DataItem;
    use tokio::sync::RwLock;

    use crate::error::NetError;

    /// Failure to inject into `post_item`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum IngestFailure {
        InsufficientFunds,
        Connectivity,
        Rejected(u16),
    }

    #[derive(Default)]
    struct State {
        posted: Vec<DataItem>,
        seeded: Vec<TaggedItem>,
        names: HashMap<String, NameRecord>,
        queries: usize,
        fail_queries: bool,
        ingest_failure: Option<IngestFailure>,
        ingest_stall: Option<Duration>,
        hide_uploads: bool,
    }

    /// Shared state for the in-memory ledger.
    #[derive(Default)]
    pub struct MemoryLedgerNetwork {
        state: RwLock<State>,
    }

    impl MemoryLedgerNetwork {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Add an item that already exists remotely.
        pub async fn seed(&self, item: TaggedItem) {
            self.state.write().await.seeded.push(item);
        }

        pub async fn register_name(&self, name: &str, record: NameRecord) {
            self.state
                .write()
                .await
                .names
                .insert(name.to_string(), record);
        }

        /// Make tag queries fail with a connectivity error.
        pub async fn set_fail_queries(&self, fail: bool) {
            self.state.write().await.fail_queries = fail;
        }

        pub async fn set_ingest_failure(&self, failure: Option<IngestFailure>) {
            self.state.write().await.ingest_failure = failure;
        }

        /// Delay every post by `stall` before answering.
        pub async fn set_ingest_stall(&self, stall: Option<Duration>) {
            self.state.write().await.ingest_stall = stall;
        }

        /// Keep posted items out of tag query results, like a gateway that
        /// has not indexed them yet.
        pub async fn set_hide_uploads(&self, hide: bool) {
            self.state.write().await.hide_uploads = hide;
        }

        /// Every item accepted so far, in order.
        pub async fn posted(&self) -> Vec<DataItem> {
            self.state.read().await.posted.clone()
        }

        pub async fn submission_count(&self) -> usize {
            self.state.read().await.posted.len()
        }

        pub async fn query_count(&self) -> usize {
            self.state.read().await.queries
        }
    }

    #[async_trait]
    impl TagQuery for MemoryLedgerNetwork {
        async fn find_by_tag(
            &self,
            name: &str,
            value: &str,
            first: u32,
        ) -> Result<Vec<TaggedItem>> {
            let mut state = self.state.write().await;
            state.queries += 1;
            if state.fail_queries {
                return Err(NetError::Connectivity {
                    endpoint: "memory graphql".into(),
                    message: "queries disabled".into(),
                });
            }

            let posted = state
                .posted
                .iter()
                .filter(|_| !state.hide_uploads)
                .map(|item| TaggedItem {
                    id: item.id(),
                    tags: item.tags().to_vec(),
                });
            // Newest first, as the gateway orders results.
            let mut matches: Vec<TaggedItem> = posted
                .chain(state.seeded.iter().cloned())
                .filter(|item| item.has_tag(name, value))
                .collect();
            matches.reverse();
            matches.truncate(first as usize);
            Ok(matches)
        }
    }

    #[async_trait]
    impl Ingest for MemoryLedgerNetwork {
        async fn post_item(&self, item: Bytes) -> Result<ItemId> {
            let (failure, stall) = {
                let state = self.state.read().await;
                (state.ingest_failure, state.ingest_stall)
            };
            if let Some(stall) = stall {
                tokio::time::sleep(stall).await;
            }

            let endpoint = "memory ingest";
            match failure {
                Some(IngestFailure::InsufficientFunds) => {
                    return Err(NetError::from_status(endpoint, 402, "Insufficient balance".into()))
                }
                Some(IngestFailure::Connectivity) => {
                    return Err(NetError::Connectivity {
                        endpoint: endpoint.into(),
                        message: "connection refused".into(),
                    })
                }
                Some(IngestFailure::Rejected(status)) => {
                    return Err(NetError::from_status(endpoint, status, "rejected".into()))
                }
                None => {}
            }

            let decoded = DataItem::from_bytes(&item)
                .and_then(|decoded| decoded.verify().map(|_| decoded))
                .map_err(|e| NetError::Rejected {
                    endpoint: endpoint.into(),
                    status: 400,
                    body: e.to_string(),
                })?;
            let id = decoded.id();
            self.state.write().await.posted.push(decoded);
            Ok(id)
        }
    }

    #[async_trait]
    impl NameResolver for MemoryLedgerNetwork {
        async fn resolve(&self, name: &str) -> Result<NameRecord> {
            self.state
                .read()
                .await
                .names
                .get(name)
                .cloned()
                .ok_or_else(|| NetError::NameNotRegistered(name.to_string()))
        }
    }
}
