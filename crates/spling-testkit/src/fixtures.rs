//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use spling_core::{Identity, Keypair, PostIdentity};
use spling_ledger::{
    FixedClock, Ledger, LedgerConfig, PostReceipt, ProfileReceipt, Result, ThreadProgram,
};
use spling_store::MemoryStore;

/// Ledger type every fixture runs.
pub type TestLedger = Ledger<MemoryStore, Arc<ThreadProgram>>;

/// Where fixture clocks start: 2026-01-01T00:00:00Z.
pub const FIXTURE_EPOCH_MILLIS: i64 = 1_767_225_600_000;

/// A keypair, an in-memory ledger, and handles on its thread program and clock.
pub struct TestFixture {
    pub keypair: Keypair,
    pub ledger: TestLedger,
    pub threads: Arc<ThreadProgram>,
    pub clock: Arc<FixedClock>,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::with_config(seed, LedgerConfig::default())
    }

    /// Create with a deterministic keypair and a custom configuration.
    ///
    /// # Panics
    ///
    /// If the configuration does not validate.
    pub fn with_config(seed: [u8; 32], config: LedgerConfig) -> Self {
        let threads = Arc::new(ThreadProgram::new(config.thread_program_id));
        let clock = Arc::new(FixedClock::new(FIXTURE_EPOCH_MILLIS));
        let ledger = Ledger::new(MemoryStore::new(), Arc::clone(&threads), config)
            .expect("fixture config must be valid")
            .with_clock(clock.clone());

        Self {
            keypair: Keypair::from_seed(&seed),
            ledger,
            threads,
            clock,
        }
    }

    /// A fixture whose ledger already has the Registry, Treasury, the
    /// fixture's own profile, and the TagRegistry.
    pub async fn bootstrapped() -> Result<Self> {
        let fixture = Self::with_seed([0x42; 32]);
        fixture.bootstrap().await?;
        Ok(fixture)
    }

    pub fn identity(&self) -> Identity {
        self.keypair.identity()
    }

    /// Run the setup sequence as this fixture's identity.
    pub async fn bootstrap(&self) -> Result<ProfileReceipt> {
        let me = self.identity();
        self.ledger.setup_spling(&me).await?;
        self.ledger.create_bank(&me).await?;
        let profile = self.ledger.create_user_profile(&me, &me, None).await?;
        self.ledger.setup_tags(&me).await?;
        Ok(profile)
    }

    /// Create a profile for another participant.
    pub async fn join(&self, keypair: &Keypair) -> Result<ProfileReceipt> {
        let who = keypair.identity();
        self.ledger.create_user_profile(&who, &who, None).await
    }

    /// Post as this fixture's identity under channel 1.
    pub async fn post(&self, content: &str) -> Result<PostReceipt> {
        self.ledger
            .submit_post(&self.identity(), 1, &PostIdentity::generate(), content, None)
            .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic keypairs for multi-party tests.
pub fn multi_party_keypairs(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0x5b;
            Keypair::from_seed(&seed)
        })
        .collect()
}
