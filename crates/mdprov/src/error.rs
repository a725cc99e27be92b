//! Error types for provenance workflows.

use std::path::PathBuf;

use mdprov_core::ItemId;
use mdprov_net::NetError;
use mdprov_store::StoreError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::signer::SubmitError;

/// Errors that can occur during provenance operations.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// Configuration or credential problem, raised before any network call.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The document to upload could not be read.
    #[error("cannot read {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP stack could not be set up.
    #[error("network setup failed: {0}")]
    Net(#[from] NetError),

    /// Local ledger error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Submission failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The index document was uploaded but its version could not be logged.
    #[error("index {item_id} uploaded but not logged: {source}")]
    IndexLog {
        item_id: ItemId,
        #[source]
        source: StoreError,
    },
}

impl ProvenanceError {
    /// The wallet must be funded before retrying.
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, ProvenanceError::Submit(SubmitError::InsufficientFunds(_)))
    }

    /// The upload service could not be reached in time.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ProvenanceError::Submit(SubmitError::Connectivity(_) | SubmitError::Timeout(_))
        )
    }
}

/// Result type for provenance operations.
pub type Result<T> = std::result::Result<T, ProvenanceError>;
