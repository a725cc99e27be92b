//! Remote dedup: asks the ledger's tag index whether content already exists.

use std::sync::Arc;

use mdprov_core::{ContentId, ItemId, UploadTag, CONTENT_ID_TAG};
use mdprov_net::TagQuery;

/// An existing remote item carrying the queried content id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMatch {
    pub item_id: ItemId,
    pub tags: Vec<UploadTag>,
}

/// Best-effort content-id lookup against the remote ledger.
///
/// Never fails: query errors are logged and read as "no match".
#[derive(Clone)]
pub struct RemoteLedgerQuery {
    query: Arc<dyn TagQuery>,
}

impl RemoteLedgerQuery {
    pub fn new(query: Arc<dyn TagQuery>) -> Self {
        Self { query }
    }

    pub async fn find_by_content_id(&self, cid: &ContentId) -> Option<RemoteMatch> {
        let value = cid.to_string();
        let items = match self.query.find_by_tag(CONTENT_ID_TAG, &value, 1).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(cid = %value, error = %e, "remote dedup query failed; treating as no match");
                return None;
            }
        };

        // Only trust nodes that really carry the tag we asked for.
        let found = items
            .into_iter()
            .find(|item| item.has_tag(CONTENT_ID_TAG, &value))?;
        Some(RemoteMatch {
            item_id: found.id,
            tags: found.tags,
        })
    }
}
