//! Error types for mdprov core.

use thiserror::Error;

/// Core errors that can occur while building or decoding primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid content identifier: {0}")]
    InvalidCid(String),

    #[error("unsupported signature type: {0}")]
    UnsupportedSignatureType(u16),

    #[error("tag limit exceeded: {0}")]
    TagLimit(String),

    #[error("malformed data item: {0}")]
    MalformedDataItem(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
