//! Named pointer updates: point a registered ArNS name at an item.
//!
//! The name is resolved to the process that owns it, then a signed AO
//! `Set-Record` message is delivered to that process through a message unit.

use std::sync::Arc;
use std::time::Duration;

use mdprov_core::{crypto::b64url_decode, CoreError, DataItemBuilder, ItemId, UploadTag};
use mdprov_net::{Ingest, NameResolver, NetError};
use thiserror::Error;

use crate::config::{Credential, DEFAULT_POINTER_TTL_SECS};

/// Undername updated by the publisher: the root of the name.
pub const ROOT_UNDERNAME: &str = "@";

/// Why a pointer update failed.
#[derive(Debug, Error)]
pub enum PointerError {
    #[error("name {0:?} is not registered")]
    NameNotRegistered(String),

    #[error("cannot resolve name: {0}")]
    Resolve(#[source] NetError),

    #[error("name record has an invalid process id {0:?}")]
    InvalidProcessId(String),

    #[error("cannot sign record update: {0}")]
    Signing(#[from] CoreError),

    #[error("record update not delivered: {0}")]
    Send(#[source] NetError),

    #[error("record update timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Result of the best-effort pointer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// The update message was accepted.
    Updated { pointer_tx: ItemId },
    /// The update failed; the reason is for display only.
    Failed(String),
}

impl PointerOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, PointerOutcome::Updated { .. })
    }
}

/// Publishes named pointer updates.
pub struct PointerPublisher {
    credential: Credential,
    resolver: Arc<dyn NameResolver>,
    messenger: Arc<dyn Ingest>,
    ttl_secs: u64,
    timeout: Duration,
}

impl PointerPublisher {
    pub fn new(
        credential: Credential,
        resolver: Arc<dyn NameResolver>,
        messenger: Arc<dyn Ingest>,
    ) -> Self {
        Self {
            credential,
            resolver,
            messenger,
            ttl_secs: DEFAULT_POINTER_TTL_SECS,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Point `name` at `target`; returns the id of the update message.
    pub async fn publish(&self, name: &str, target: &ItemId) -> Result<ItemId, PointerError> {
        let record = self.resolver.resolve(name).await.map_err(|e| match e {
            NetError::NameNotRegistered(name) => PointerError::NameNotRegistered(name),
            other => PointerError::Resolve(other),
        })?;
        let process: [u8; 32] = b64url_decode(&record.process_id)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| PointerError::InvalidProcessId(record.process_id.clone()))?;

        tracing::info!(
            name,
            process_id = %record.process_id,
            %target,
            ttl = self.ttl_secs,
            "updating name record"
        );

        let message = DataItemBuilder::new(Vec::new())
            .tags(set_record_tags(target, self.ttl_secs))
            .target(process)
            .anchor(rand::random())
            .sign(self.credential.keypair())?;
        let bytes = message.to_bytes()?;

        tokio::time::timeout(self.timeout, self.messenger.post_item(bytes.into()))
            .await
            .map_err(|_| PointerError::Timeout(self.timeout))?
            .map_err(PointerError::Send)
    }

    /// [`publish`](Self::publish), with failure captured instead of returned.
    pub async fn publish_best_effort(&self, name: &str, target: &ItemId) -> PointerOutcome {
        match self.publish(name, target).await {
            Ok(pointer_tx) => PointerOutcome::Updated { pointer_tx },
            Err(e) => {
                tracing::warn!(name, %target, error = %e, "name record update failed");
                PointerOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Tags of an AO `Set-Record` message for the root undername.
fn set_record_tags(target: &ItemId, ttl_secs: u64) -> Vec<UploadTag> {
    vec![
        UploadTag::new("Data-Protocol", "ao"),
        UploadTag::new("Variant", "ao.TN.1"),
        UploadTag::new("Type", "Message"),
        UploadTag::new("Action", "Set-Record"),
        UploadTag::new("Sub-Domain", ROOT_UNDERNAME),
        UploadTag::new("Transaction-Id", target.as_str()),
        UploadTag::new("TTL-Seconds", ttl_secs.to_string()),
    ]
}
