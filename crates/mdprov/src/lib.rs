//! # mdprov
//!
//! Markdown provenance on a permanent ledger: content-addressed dedup,
//! signed uploads, a local transaction log, and a named index document.
//!
//! ## Overview
//!
//! - **Content ids**: every document is identified by its CIDv1 (raw, sha2-256)
//! - **Dedup**: the local ledger is consulted first, then the remote tag index;
//!   content is only signed and submitted when both miss
//! - **Ledger**: each new upload appends one record to `transactions.jsonl`
//! - **Index**: a markdown summary of all records, republished on demand and
//!   pointed at by a registered ArNS name
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mdprov::{build_service, ProvenanceConfig, UploadRequest};
//!
//! async fn example() -> mdprov::Result<()> {
//!     let config = ProvenanceConfig::from_env()?;
//!     let service = build_service(&config)?;
//!
//!     let request = UploadRequest::new("essay.md").with_author("Ada");
//!     let result = service.upload(b"# Essay\n", &request).await?;
//!     println!("{} ({:?})", result.item_id, result.origin);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `mdprov::core` - Content ids, tags, data items, records
//! - `mdprov::store` - Local ledgers
//! - `mdprov::net` - Remote ledger adapters

pub mod config;
pub mod error;
pub mod index;
pub mod pointer;
pub mod remote;
pub mod service;
pub mod signer;

// Re-export component crates
pub use mdprov_core as core;
pub use mdprov_net as net;
pub use mdprov_store as store;

pub use config::{ConfigError, Credential, ProvenanceConfig};
pub use error::{ProvenanceError, Result};
pub use index::{render_index, IndexContext, IndexOutcome, IndexSync};
pub use pointer::{PointerError, PointerOutcome, PointerPublisher};
pub use remote::{RemoteLedgerQuery, RemoteMatch};
pub use service::{read_document, ProvenanceService, ServiceConfig, UploadRequest};
pub use signer::{SignedUploader, SubmitError, UploadSigner};

// Re-export commonly used core types
pub use mdprov_core::{
    ContentId, DedupSource, IndexVersion, ItemId, Keypair, LedgerRecord, Origin, TagSet,
    UploadResult, UploadTag,
};

use std::sync::Arc;

use mdprov_net::{http_client, GatewayClient, MessengerClient, UploadClient};

/// Wire a [`ProvenanceService`] to the configured HTTP services and the
/// file ledger in the state directory.
///
/// Loads the credential first, so a missing or broken key fails before any
/// network traffic.
pub fn build_service(config: &ProvenanceConfig) -> Result<ProvenanceService> {
    let credential = config.credential()?;
    let http = http_client(config.upload_timeout)?;
    Ok(service_with(config, credential, http))
}

/// Wire an [`IndexSync`] to the configured HTTP services.
///
/// Fails before any network traffic if the registered name or the credential
/// is missing.
pub fn build_index_sync(config: &ProvenanceConfig) -> Result<IndexSync> {
    config.require_arns_name()?;
    let credential = config.credential()?;
    let http = http_client(config.upload_timeout)?;

    let service = Arc::new(service_with(config, credential.clone(), http.clone()));
    let gateway = Arc::new(GatewayClient::new(http.clone(), config.gateway_url.clone()));
    let messenger = Arc::new(MessengerClient::new(http, config.ao_mu_url.clone()));
    let publisher = PointerPublisher::new(credential, gateway, messenger)
        .with_ttl(config.pointer_ttl_secs)
        .with_timeout(config.upload_timeout);

    let state = config.state();
    Ok(IndexSync::new(
        service,
        Arc::new(state.index_history()),
        publisher,
        state,
        config.arns_name.clone(),
    ))
}

fn service_with(
    config: &ProvenanceConfig,
    credential: Credential,
    http: reqwest::Client,
) -> ProvenanceService {
    let gateway = Arc::new(GatewayClient::new(http.clone(), config.gateway_url.clone()));
    let upload = Arc::new(UploadClient::new(http, config.upload_url.clone()));
    let signer = SignedUploader::new(credential, upload, config.upload_timeout);

    ProvenanceService::new(
        Arc::new(config.state().ledger()),
        RemoteLedgerQuery::new(gateway),
        Arc::new(signer),
        ServiceConfig::default(),
    )
}
