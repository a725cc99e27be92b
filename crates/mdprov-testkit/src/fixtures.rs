//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a deterministic key, an
//! in-memory network, in-memory ledgers and a temporary state directory.

use std::sync::Arc;
use std::time::Duration;

use mdprov::{
    Credential, IndexSync, PointerPublisher, ProvenanceService, RemoteLedgerQuery, ServiceConfig,
    SignedUploader,
};
use mdprov_core::Keypair;
use mdprov_net::{MemoryLedgerNetwork, NameRecord};
use mdprov_store::{LocalLedger, MemoryIndexHistory, MemoryLedger, StateDir};
use tempfile::TempDir;

/// Seed of the fixture key.
pub const TEST_SEED: [u8; 32] = [0x01; 32];
/// Name registered by [`TestFixture::register_name`].
pub const TEST_ARNS_NAME: &str = "test-brain";
/// Process that owns [`TEST_ARNS_NAME`]: base64url of the bytes `0..32`.
pub const TEST_PROCESS_ID: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// A key, an in-memory network, and the stores a service runs against.
pub struct TestFixture {
    pub keypair: Keypair,
    pub network: Arc<MemoryLedgerNetwork>,
    pub ledger: Arc<MemoryLedger>,
    pub history: Arc<MemoryIndexHistory>,
    pub config: ServiceConfig,
    pub timeout: Duration,
    state_dir: TempDir,
}

impl TestFixture {
    /// Create a fixture with the deterministic test key.
    pub fn new() -> Self {
        Self::with_seed(TEST_SEED)
    }

    /// Create a fixture keyed from `seed`.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_keypair(Keypair::from_seed(&seed))
    }

    /// Create a fixture that signs with `keypair`.
    pub fn with_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            network: MemoryLedgerNetwork::new(),
            ledger: Arc::new(MemoryLedger::new()),
            history: Arc::new(MemoryIndexHistory::new()),
            config: ServiceConfig::default(),
            timeout: Duration::from_secs(5),
            state_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn credential(&self) -> Credential {
        Credential::from_keypair(self.keypair.clone())
    }

    /// Wallet address of the fixture key.
    pub fn address(&self) -> String {
        self.keypair.owner().address()
    }

    /// A state directory that is removed with the fixture.
    pub fn state(&self) -> StateDir {
        StateDir::new(self.state_dir.path())
    }

    /// Register [`TEST_ARNS_NAME`] on the network.
    pub async fn register_name(&self) {
        self.network
            .register_name(
                TEST_ARNS_NAME,
                NameRecord {
                    process_id: TEST_PROCESS_ID.to_string(),
                    tx_id: None,
                    ttl_seconds: None,
                },
            )
            .await;
    }

    /// A service over the in-memory ledger.
    pub fn service(&self) -> ProvenanceService {
        self.service_over(self.ledger.clone())
    }

    /// A service over the JSONL ledger in the state directory.
    pub fn file_service(&self) -> ProvenanceService {
        self.service_over(Arc::new(self.state().ledger()))
    }

    /// A service over any ledger.
    pub fn service_over(&self, ledger: Arc<dyn LocalLedger>) -> ProvenanceService {
        let signer = SignedUploader::new(self.credential(), self.network.clone(), self.timeout);
        ProvenanceService::new(
            ledger,
            RemoteLedgerQuery::new(self.network.clone()),
            Arc::new(signer),
            self.config.clone(),
        )
    }

    pub fn publisher(&self) -> PointerPublisher {
        PointerPublisher::new(
            self.credential(),
            self.network.clone(),
            self.network.clone(),
        )
        .with_timeout(self.timeout)
    }

    /// An index sync over the in-memory ledger and history.
    pub fn index_sync(&self, arns_name: Option<&str>) -> IndexSync {
        IndexSync::new(
            Arc::new(self.service()),
            self.history.clone(),
            self.publisher(),
            self.state(),
            arns_name.map(str::to_string),
        )
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
