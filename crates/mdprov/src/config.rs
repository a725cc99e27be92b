//! Provenance configuration.
//!
//! Built once at startup from the environment and passed down. Defaults point
//! at the public gateway and upload services; every URL can be overridden for
//! staging or testing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mdprov_core::Keypair;
use mdprov_store::StateDir;
use url::Url;

/// Default registered-name record TTL.
pub const DEFAULT_POINTER_TTL_SECS: u64 = 300;
/// Default bound on a single submission.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_GATEWAY_URL: &str = "https://arweave.net";
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.ardrive.io";
pub const DEFAULT_AO_MU_URL: &str = "https://mu.ao-testnet.xyz";

const STATE_DIR_NAME: &str = ".markdown-provenance";

/// Configuration for provenance workflows.
#[derive(Debug, Clone)]
pub struct ProvenanceConfig {
    /// Path to the signing key (JWK). Required only for operations that sign.
    pub credential_path: Option<PathBuf>,
    /// Default `Author` tag.
    pub author: Option<String>,
    /// Registered name updated by index sync.
    pub arns_name: Option<String>,
    pub pointer_ttl_secs: u64,
    /// Directory holding the ledgers.
    pub state_dir: PathBuf,
    pub gateway_url: Url,
    pub upload_url: Url,
    pub ao_mu_url: Url,
    pub upload_timeout: Duration,
}

impl ProvenanceConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `MP_WALLET_PATH` (required to sign)
    /// - `MP_AUTHOR`
    /// - `MP_ARNS_NAME` (required for index sync)
    /// - `MP_ARNS_TTL` (default: 300)
    /// - `MP_HOME` (default: `~/.markdown-provenance`)
    /// - `MP_GATEWAY_URL` (default: `https://arweave.net`)
    /// - `MP_UPLOAD_URL` (default: `https://upload.ardrive.io`)
    /// - `MP_AO_MU_URL` (default: `https://mu.ao-testnet.xyz`)
    /// - `MP_UPLOAD_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let state_dir = match get("MP_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(STATE_DIR_NAME),
        };

        Ok(Self {
            credential_path: get("MP_WALLET_PATH").map(PathBuf::from),
            author: get("MP_AUTHOR"),
            arns_name: get("MP_ARNS_NAME"),
            pointer_ttl_secs: positive(&get, "MP_ARNS_TTL", DEFAULT_POINTER_TTL_SECS)?,
            state_dir,
            gateway_url: url_var(&get, "MP_GATEWAY_URL", DEFAULT_GATEWAY_URL)?,
            upload_url: url_var(&get, "MP_UPLOAD_URL", DEFAULT_UPLOAD_URL)?,
            ao_mu_url: url_var(&get, "MP_AO_MU_URL", DEFAULT_AO_MU_URL)?,
            upload_timeout: Duration::from_secs(positive(
                &get,
                "MP_UPLOAD_TIMEOUT_SECS",
                DEFAULT_UPLOAD_TIMEOUT_SECS,
            )?),
        })
    }

    /// A configuration rooted at `state_dir` with default endpoints.
    pub fn with_state_dir(state_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let state_dir = state_dir.into();
        let home = state_dir.display().to_string();
        let mut config = Self::from_lookup(|var| (var == "MP_HOME").then(|| home.clone()))?;
        config.state_dir = state_dir;
        Ok(config)
    }

    pub fn state(&self) -> StateDir {
        StateDir::new(&self.state_dir)
    }

    /// Load and validate the signing credential.
    pub fn credential(&self) -> Result<Credential, ConfigError> {
        let path = self
            .credential_path
            .as_deref()
            .ok_or(ConfigError::MissingWallet)?;
        Credential::load(path)
    }

    /// The registered name, required for index sync.
    pub fn require_arns_name(&self) -> Result<&str, ConfigError> {
        self.arns_name.as_deref().ok_or(ConfigError::MissingArnsName)
    }
}

fn url_var<G>(get: &G, var: &str, default: &str) -> Result<Url, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let raw = get(var).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn positive<G>(get: &G, var: &str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidNumber {
                var: var.to_string(),
                value: raw,
            }),
        },
    }
}

/// A validated signing credential.
///
/// `Debug` prints only the wallet address.
#[derive(Clone)]
pub struct Credential {
    keypair: Keypair,
}

impl Credential {
    /// Read and validate a JWK key file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::WalletUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        let keypair = Keypair::from_jwk_json(&text).map_err(|e| ConfigError::InvalidWallet {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { keypair })
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// The wallet address derived from the public key.
    pub fn address(&self) -> String {
        self.keypair.owner().address()
    }

    pub(crate) fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MP_WALLET_PATH environment variable is not set")]
    MissingWallet,
    #[error("cannot read key file {path}: {source}")]
    WalletUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("key file {path} is not a usable signing JWK: {message}")]
    InvalidWallet { path: PathBuf, message: String },
    #[error("MP_ARNS_NAME environment variable is not set")]
    MissingArnsName,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: String, value: String },
    #[error("cannot determine the home directory; set MP_HOME")]
    NoHomeDir,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdprov_core::Jwk;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_vars_absent() {
        let cfg = ProvenanceConfig::from_lookup(lookup(&[("MP_HOME", "/tmp/mp")])).unwrap();
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/mp"));
        assert_eq!(cfg.pointer_ttl_secs, 300);
        assert_eq!(cfg.upload_timeout, Duration::from_secs(60));
        assert_eq!(cfg.gateway_url.as_str(), "https://arweave.net/");
        assert_eq!(cfg.upload_url.as_str(), "https://upload.ardrive.io/");
        assert_eq!(cfg.ao_mu_url.as_str(), "https://mu.ao-testnet.xyz/");
        assert!(cfg.credential_path.is_none());
        assert!(matches!(cfg.credential(), Err(ConfigError::MissingWallet)));
        assert!(matches!(
            cfg.require_arns_name(),
            Err(ConfigError::MissingArnsName)
        ));
    }

    #[test]
    fn reads_overrides() {
        let cfg = ProvenanceConfig::from_lookup(lookup(&[
            ("MP_HOME", "/tmp/mp"),
            ("MP_AUTHOR", "Ada Lovelace"),
            ("MP_ARNS_NAME", "ada"),
            ("MP_ARNS_TTL", "900"),
            ("MP_GATEWAY_URL", "http://127.0.0.1:1984"),
            ("MP_UPLOAD_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(cfg.author.as_deref(), Some("Ada Lovelace"));
        assert_eq!(cfg.require_arns_name().unwrap(), "ada");
        assert_eq!(cfg.pointer_ttl_secs, 900);
        assert_eq!(cfg.gateway_url.as_str(), "http://127.0.0.1:1984/");
        assert_eq!(cfg.upload_timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = ProvenanceConfig::from_lookup(lookup(&[
            ("MP_HOME", "/tmp/mp"),
            ("MP_AUTHOR", "   "),
            ("MP_ARNS_TTL", ""),
        ]))
        .unwrap();
        assert!(cfg.author.is_none());
        assert_eq!(cfg.pointer_ttl_secs, 300);
    }

    #[test]
    fn rejects_invalid_values() {
        let bad_ttl = ProvenanceConfig::from_lookup(lookup(&[
            ("MP_HOME", "/tmp/mp"),
            ("MP_ARNS_TTL", "0"),
        ]));
        assert!(matches!(bad_ttl, Err(ConfigError::InvalidNumber { .. })));

        let bad_url = ProvenanceConfig::from_lookup(lookup(&[
            ("MP_HOME", "/tmp/mp"),
            ("MP_UPLOAD_URL", "not a url"),
        ]));
        assert!(matches!(bad_url, Err(ConfigError::InvalidUrl(var, _)) if var == "MP_UPLOAD_URL"));
    }

    #[test]
    fn loads_credential_from_jwk_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let keypair = Keypair::from_seed(&[0x01; 32]);
        std::fs::write(&path, serde_json::to_string(&keypair.to_jwk()).unwrap()).unwrap();

        let credential = Credential::load(&path).unwrap();
        assert_eq!(
            credential.address(),
            "NHUPmL1Z_PyUbaRaqr6TO-FUpLUJThxKv0KGZQXzyX4"
        );
        let debug = format!("{credential:?}");
        assert!(debug.contains("NHUPmL1Z"));
        let Jwk::Okp { d: Some(seed), .. } = keypair.to_jwk() else {
            panic!("expected an OKP key");
        };
        assert!(!debug.contains(seed.as_str()));
    }

    #[test]
    fn loads_credential_from_arweave_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        std::fs::write(
            &path,
            include_str!("../../mdprov-core/testdata/arweave-wallet.json"),
        )
        .unwrap();

        let credential = Credential::load(&path).unwrap();
        assert_eq!(
            credential.address(),
            "IA9_WmkHkLUsdIiXWTfi5X2Nw8fHF0SNd6H8L9_tAIM"
        );
        assert_eq!(
            credential.keypair().signature_type(),
            mdprov_core::SignatureType::Arweave
        );
    }

    #[test]
    fn credential_errors_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            Credential::load(&missing),
            Err(ConfigError::WalletUnreadable { .. })
        ));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{\"kty\":\"RSA\"}").unwrap();
        assert!(matches!(
            Credential::load(&garbage),
            Err(ConfigError::InvalidWallet { .. })
        ));
    }
}
