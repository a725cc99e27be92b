//! The provenance service: dedup-then-upload of markdown content.
//!
//! For each upload the service computes the content id and consults, in
//! order, the local ledger and the remote tag index. Only when both miss is
//! the content signed and submitted, after which a ledger record is appended.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use mdprov_core::{
    ContentId, DedupSource, ItemId, LedgerRecord, Origin, TagSet, UploadResult, UploadTag,
};
use mdprov_store::LocalLedger;

use crate::error::{ProvenanceError, Result};
use crate::remote::RemoteLedgerQuery;
use crate::signer::UploadSigner;

pub const APP_NAME: &str = "Markdown Provenance";
pub const CONTENT_TYPE_MARKDOWN: &str = "text/markdown";
/// Tag set on ledger records cached from a remote hit.
pub const DEDUP_SOURCE_TAG: &str = "Dedup-Source";

/// Configuration for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Value of the `App-Version` tag.
    pub app_version: String,
    /// Record remote dedup hits in the local ledger so the next lookup
    /// stays local.
    pub cache_remote_hits: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            cache_remote_hits: true,
        }
    }
}

/// What to upload besides the bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    /// Name recorded in the ledger.
    pub display_name: String,
    pub author: Option<String>,
    /// Extra tags, appended after the standard ones.
    pub tags: Vec<UploadTag>,
}

impl UploadRequest {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(UploadTag::new(name, value));
        self
    }

    /// Record the original file name as a `File-Name` tag.
    pub fn with_file_name(self, file_name: impl Into<String>) -> Self {
        self.with_tag("File-Name", file_name)
    }

    /// Record where the content came from as a `Source` tag.
    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.with_tag("Source", source)
    }

    /// The author to tag, if it is not blank.
    pub fn author_tag(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.trim().is_empty())
    }
}

/// Read a document to upload.
pub async fn read_document(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ProvenanceError::Document {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Dedup-aware uploader.
pub struct ProvenanceService {
    ledger: Arc<dyn LocalLedger>,
    remote: RemoteLedgerQuery,
    signer: Arc<dyn UploadSigner>,
    config: ServiceConfig,
}

impl ProvenanceService {
    pub fn new(
        ledger: Arc<dyn LocalLedger>,
        remote: RemoteLedgerQuery,
        signer: Arc<dyn UploadSigner>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            ledger,
            remote,
            signer,
            config,
        }
    }

    pub fn ledger(&self) -> &Arc<dyn LocalLedger> {
        &self.ledger
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Upload content unless it already exists locally or remotely.
    pub async fn upload(&self, content: &[u8], request: &UploadRequest) -> Result<UploadResult> {
        let cid = ContentId::identify(content);
        let size = content.len() as u64;
        tracing::info!(%cid, size, name = %request.display_name, "uploading");

        if let Some(record) = self.ledger.find_by_content_id(&cid).await? {
            tracing::info!(%cid, item_id = %record.tx_id, "found in local ledger");
            return Ok(UploadResult::new(
                record.tx_id,
                record.cid,
                record.size,
                Origin::Existing(DedupSource::Local),
            ));
        }

        if let Some(found) = self.remote.find_by_content_id(&cid).await {
            tracing::info!(%cid, item_id = %found.item_id, "found on remote ledger");
            let result = UploadResult::new(
                found.item_id,
                cid,
                size,
                Origin::Existing(DedupSource::Remote),
            );
            if self.config.cache_remote_hits {
                self.cache_remote_hit(&result, request).await;
            }
            return Ok(result);
        }

        let tags = self.standard_tags(&cid, request);
        let item_id = self.signer.submit(content, &tags).await?;
        let result = UploadResult::new(item_id, cid, size, Origin::New);

        let record = LedgerRecord::from_result(
            &result,
            request.display_name.clone(),
            record_tags(&tags),
            Utc::now(),
        );
        self.ledger.append(&record).await?;
        tracing::info!(item_id = %result.item_id, "upload recorded");
        Ok(result)
    }

    /// Submit without dedup and without a ledger record.
    ///
    /// For documents that are expected to change on every call. A content-id
    /// tag is added if `tags` lacks one.
    pub async fn submit_unchecked(
        &self,
        content: &[u8],
        display_name: &str,
        tags: TagSet,
    ) -> Result<UploadResult> {
        let cid = ContentId::identify(content);
        let tags = tags.with_content_id(&cid);
        tracing::info!(%cid, name = display_name, "submitting without dedup");

        let item_id: ItemId = self.signer.submit(content, &tags).await?;
        Ok(UploadResult::new(
            item_id,
            cid,
            content.len() as u64,
            Origin::New,
        ))
    }

    /// The tag set for a fresh upload.
    ///
    /// Order: `Content-Type`, `App-Name`, `App-Version`, `Type`, `IPFS-CID`,
    /// `Author`, then the request's extras. An extra `IPFS-CID` is dropped.
    pub fn standard_tags(&self, cid: &ContentId, request: &UploadRequest) -> TagSet {
        let mut tags = TagSet::new()
            .with("Content-Type", CONTENT_TYPE_MARKDOWN)
            .with("App-Name", APP_NAME)
            .with("App-Version", self.config.app_version.clone())
            .with("Type", "Attestation")
            .with_content_id(cid);
        if let Some(author) = request.author_tag() {
            tags = tags.with("Author", author);
        }
        for tag in &request.tags {
            if !tags.push(tag.clone()) {
                tracing::debug!(value = %tag.value, "dropping duplicate content-id tag");
            }
        }
        tags
    }

    async fn cache_remote_hit(&self, result: &UploadResult, request: &UploadRequest) {
        let mut tags = BTreeMap::new();
        tags.insert(DEDUP_SOURCE_TAG.to_string(), "remote".to_string());
        if let Some(author) = request.author_tag() {
            tags.insert("Author".to_string(), author.to_string());
        }
        let record = LedgerRecord::from_result(
            result,
            request.display_name.clone(),
            tags,
            Utc::now(),
        );
        if let Err(e) = self.ledger.append(&record).await {
            tracing::warn!(item_id = %result.item_id, error = %e, "could not cache remote hit locally");
        }
    }
}

/// Tags worth keeping in the ledger: everything except those that are
/// identical on every upload.
fn record_tags(tags: &TagSet) -> BTreeMap<String, String> {
    const IMPLIED: [&str; 5] = ["Content-Type", "App-Name", "App-Version", "Type", "IPFS-CID"];
    tags.to_map()
        .into_iter()
        .filter(|(name, _)| !IMPLIED.contains(&name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;
    use crate::signer::SignedUploader;
    use mdprov_core::{Keypair, CONTENT_ID_TAG};
    use mdprov_net::MemoryLedgerNetwork;
    use mdprov_store::MemoryLedger;
    use std::time::Duration;

    fn service(network: Arc<MemoryLedgerNetwork>, ledger: Arc<MemoryLedger>) -> ProvenanceService {
        let signer = SignedUploader::new(
            Credential::from_keypair(Keypair::from_seed(&[0x01; 32])),
            network.clone(),
            Duration::from_secs(5),
        );
        ProvenanceService::new(
            ledger,
            RemoteLedgerQuery::new(network),
            Arc::new(signer),
            ServiceConfig::default(),
        )
    }

    #[test]
    fn standard_tag_order() {
        let svc = service(MemoryLedgerNetwork::new(), Arc::new(MemoryLedger::new()));
        let cid = ContentId::identify(b"# Hello");
        let request = UploadRequest::new("hello.md")
            .with_author("Ada")
            .with_tag(CONTENT_ID_TAG, "bafkreibogus")
            .with_file_name("hello.md")
            .with_source("https://example.com/hello");

        let tags = svc.standard_tags(&cid, &request);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Content-Type",
                "App-Name",
                "App-Version",
                "Type",
                "IPFS-CID",
                "Author",
                "File-Name",
                "Source"
            ]
        );
        assert_eq!(tags.content_id(), Some(cid.to_string().as_str()));
    }

    #[test]
    fn record_tags_drop_implied() {
        let tags = TagSet::new()
            .with("Content-Type", CONTENT_TYPE_MARKDOWN)
            .with("App-Name", APP_NAME)
            .with("Author", "Ada")
            .with("Source", "web");
        let kept = record_tags(&tags);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.get("Author").map(String::as_str), Some("Ada"));
    }

    #[tokio::test]
    async fn blank_author_is_omitted() {
        let svc = service(MemoryLedgerNetwork::new(), Arc::new(MemoryLedger::new()));
        let request = UploadRequest::new("a.md").with_author("  ");
        let tags = svc.standard_tags(&ContentId::identify(b"a"), &request);
        assert!(tags.get("Author").is_none());
    }

    proptest::proptest! {
        #[test]
        fn exactly_one_content_id_tag(
            extras in proptest::collection::vec(("[A-Za-z-]{1,12}", "[a-z0-9]{1,16}"), 0..8),
            forged in proptest::collection::vec("[a-z0-9]{1,16}", 0..3),
        ) {
            let svc = service(MemoryLedgerNetwork::new(), Arc::new(MemoryLedger::new()));
            let mut request = UploadRequest::new("p.md");
            for (name, value) in extras {
                request = request.with_tag(name, value);
            }
            for value in forged {
                request = request.with_tag(CONTENT_ID_TAG, value);
            }
            let cid = ContentId::identify(b"prop");
            let tags = svc.standard_tags(&cid, &request);
            proptest::prop_assert_eq!(tags.count(CONTENT_ID_TAG), 1);
            let cid_str = cid.to_string();
            proptest::prop_assert_eq!(tags.content_id(), Some(cid_str.as_str()));
        }
    }

    #[tokio::test]
    async fn submit_unchecked_skips_dedup_and_ledger() {
        let network = MemoryLedgerNetwork::new();
        let ledger = Arc::new(MemoryLedger::new());
        let svc = service(network.clone(), ledger.clone());

        let tags = TagSet::new().with("Type", "Agent-Brain");
        svc.submit_unchecked(b"index", "index.md", tags.clone())
            .await
            .unwrap();
        svc.submit_unchecked(b"index", "index.md", tags).await.unwrap();

        assert_eq!(network.submission_count().await, 2);
        assert_eq!(network.query_count().await, 0);
        assert!(ledger.is_empty());

        let posted = network.posted().await;
        let cid_tags = posted[0]
            .tags()
            .iter()
            .filter(|t| t.name == CONTENT_ID_TAG)
            .count();
        assert_eq!(cid_tags, 1);
    }
}
