//! CLI command implementations

pub mod cid;
pub mod history;
pub mod index;
pub mod keygen;
pub mod upload;

use anyhow::{Context, Result};
use mdprov::ProvenanceConfig;

pub(crate) fn load_config() -> Result<ProvenanceConfig> {
    let config = ProvenanceConfig::from_env().context("invalid configuration")?;
    tracing::debug!(
        state_dir = %config.state_dir.display(),
        gateway = %config.gateway_url,
        upload = %config.upload_url,
        "configuration loaded"
    );
    Ok(config)
}
