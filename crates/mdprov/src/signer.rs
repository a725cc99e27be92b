//! Signed submission of content to the permanent ledger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mdprov_core::{CoreError, DataItemBuilder, ItemId, TagSet};
use mdprov_net::{Ingest, NetError};
use thiserror::Error;

use crate::config::Credential;

/// Why a submission failed. Every kind is fatal for the attempt.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The data item could not be built or signed.
    #[error("cannot sign upload: {0}")]
    Signing(#[from] CoreError),

    /// The paying wallet cannot cover the upload.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The upload service could not be reached.
    #[error("cannot reach upload service: {0}")]
    Connectivity(String),

    #[error("upload timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The upload service refused the item.
    #[error("upload rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The upload service answered with something unreadable.
    #[error("unexpected response from upload service: {0}")]
    InvalidResponse(String),
}

impl SubmitError {
    fn from_net(err: NetError, timeout: Duration) -> Self {
        match err {
            NetError::InsufficientFunds { body, .. } => SubmitError::InsufficientFunds(body),
            NetError::Connectivity { message, .. } => SubmitError::Connectivity(message),
            NetError::Client(message) => SubmitError::Connectivity(message),
            NetError::Timeout { .. } => SubmitError::Timeout(timeout),
            NetError::Rejected { status, body, .. } => SubmitError::Rejected { status, body },
            other @ (NetError::Decode { .. } | NetError::NameNotRegistered(_)) => {
                SubmitError::InvalidResponse(other.to_string())
            }
        }
    }
}

/// Submits content with tags and returns the new item id.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn submit(&self, content: &[u8], tags: &TagSet) -> Result<ItemId, SubmitError>;
}

/// Signs content as an ANS-104 data item and posts it to an ingestion
/// service under a bounded timeout.
pub struct SignedUploader {
    credential: Credential,
    ingest: Arc<dyn Ingest>,
    timeout: Duration,
}

impl SignedUploader {
    pub fn new(credential: Credential, ingest: Arc<dyn Ingest>, timeout: Duration) -> Self {
        Self {
            credential,
            ingest,
            timeout,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

#[async_trait]
impl UploadSigner for SignedUploader {
    async fn submit(&self, content: &[u8], tags: &TagSet) -> Result<ItemId, SubmitError> {
        let item = DataItemBuilder::new(content.to_vec())
            .tags(tags.iter().cloned())
            .sign(self.credential.keypair())?;
        let local_id = item.id();
        let bytes = item.to_bytes()?;

        tracing::info!(
            item_id = %local_id,
            size = bytes.len(),
            tags = tags.len(),
            "submitting data item"
        );

        let id = tokio::time::timeout(self.timeout, self.ingest.post_item(bytes.into()))
            .await
            .map_err(|_| SubmitError::Timeout(self.timeout))?
            .map_err(|e| SubmitError::from_net(e, self.timeout))?;

        if id != local_id {
            tracing::warn!(
                expected = %local_id,
                returned = %id,
                "upload service returned a different item id"
            );
        }
        Ok(id)
    }
}
