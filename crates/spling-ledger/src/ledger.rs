//! The Ledger: the Spling state machine.
//!
//! Every instruction reads what it needs, checks its preconditions, and
//! commits all of its writes as one [`WriteBatch`]. Instructions that
//! update a counter hold the store's write gate from the read to the
//! commit, so writers through the gate never invalidate each other. The
//! revision check on every update still guards against writers that
//! bypass the gate; those conflicts are retried up to
//! `max_commit_attempts` times.

use std::sync::Arc;

use spling_core::address::{
    follow_address, group_address, like_address, membership_address, profile_address,
    registry_address, tags_address, treasury_address,
};
use spling_core::{
    normalize_alias, validate_signature, Account, AccountKind, Address, Blake3Hash, Follow,
    GroupProfile, Identity, Instruction, Like, Likes, Limits, Membership, Post, Profile, Registry,
    Reply, SignedInstruction, TagRegistry, Treasury, STATUS_ACTIVE,
};
use spling_store::{AccountRecord, CommitResult, Store, WriteBatch};
use tracing::Instrument;

use crate::bridge::ThreadBridge;
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::error::{Dependency, LedgerError, Result};
use crate::payments::{DisabledPayments, PaymentRail, PAYMENT_INTERFACE_VERSION};

/// A created profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileReceipt {
    pub address: Address,
    pub uid: u64,
}

/// A created group profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupReceipt {
    pub address: Address,
    pub gid: u64,
}

/// Everything a new post created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostReceipt {
    pub post: Address,
    pub likes: Address,
    pub thread: Address,
    pub pid: u64,
    pub tag: Option<u16>,
}

/// A created follow relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowReceipt {
    pub address: Address,
    pub follower_uid: u64,
    pub target_uid: u64,
}

/// A created group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipReceipt {
    pub address: Address,
    pub uid: u64,
    pub gid: u64,
}

/// A created reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyReceipt {
    pub address: Address,
    pub post: Address,
    pub pid: u64,
}

/// Result of [`Ledger::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A singleton was created at this address.
    Initialized(Address),
    Profile(ProfileReceipt),
    Group(GroupReceipt),
    Post(PostReceipt),
    /// A like counter moved to `count`.
    Liked { post: Address, count: u64 },
    Reply(ReplyReceipt),
    Followed(FollowReceipt),
    Joined(MembershipReceipt),
}

/// Addresses of the singletons, derived once.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Singletons {
    pub(crate) registry: (Address, u8),
    pub(crate) treasury: (Address, u8),
    pub(crate) tags: (Address, u8),
}

/// The main Ledger struct.
///
/// Generic over the storage backend and the thread protocol bridge.
pub struct Ledger<S: Store, B: ThreadBridge> {
    pub(crate) store: Arc<S>,
    pub(crate) bridge: B,
    pub(crate) config: LedgerConfig,
    pub(crate) limits: Limits,
    pub(crate) singletons: Singletons,
    pub(crate) payments: Box<dyn PaymentRail>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<S: Store, B: ThreadBridge> Ledger<S, B> {
    /// Create a ledger over a store and a thread bridge.
    pub fn new(store: S, bridge: B, config: LedgerConfig) -> Result<Self> {
        Self::with_shared_store(Arc::new(store), bridge, config)
    }

    /// Create a ledger over a store that is also held elsewhere.
    pub fn with_shared_store(store: Arc<S>, bridge: B, config: LedgerConfig) -> Result<Self> {
        config.validate()?;

        let program = config.program_id;
        let singletons = Singletons {
            registry: registry_address(&program)?,
            treasury: treasury_address(&program)?,
            tags: tags_address(&program)?,
        };

        Ok(Self {
            store,
            bridge,
            limits: config.limits(),
            config,
            singletons,
            payments: Box::new(DisabledPayments),
            clock: Arc::new(SystemClock),
        })
    }

    /// Use a different time source for `created_at`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Install a payment rail.
    ///
    /// Fails with `UnsupportedExtension` unless the rail speaks
    /// [`PAYMENT_INTERFACE_VERSION`].
    pub fn with_payments(mut self, rail: impl PaymentRail + 'static) -> Result<Self> {
        if rail.interface_version() != PAYMENT_INTERFACE_VERSION {
            return Err(LedgerError::UnsupportedExtension {
                name: rail.name(),
                found: rail.interface_version(),
                expected: PAYMENT_INTERFACE_VERSION,
            });
        }
        self.payments = Box::new(rail);
        Ok(self)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn registry_address(&self) -> Address {
        self.singletons.registry.0
    }

    pub fn treasury_address(&self) -> Address {
        self.singletons.treasury.0
    }

    pub fn tags_address(&self) -> Address {
        self.singletons.tags.0
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signed entry point
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify and apply a signed instruction.
    pub async fn execute(&self, signed: &SignedInstruction) -> Result<Outcome> {
        let id = signed.id()?;
        let span = tracing::info_span!(
            "instruction",
            id = %id,
            op = signed.instruction.name(),
            signer = %signed.signer,
        );

        async {
            let result = self.dispatch(signed).await;
            if let Err(e) = &result {
                tracing::debug!(error = %e, "instruction rejected");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, signed: &SignedInstruction) -> Result<Outcome> {
        if self.config.verify_signatures {
            validate_signature(signed)?;
        }

        let caller = &signed.signer;
        match &signed.instruction {
            Instruction::SetupSpling => self.setup_spling(caller).await.map(Outcome::Initialized),
            Instruction::CreateBank => self.create_bank(caller).await.map(Outcome::Initialized),
            Instruction::CreateUserProfile { payout, alias } => self
                .create_user_profile(caller, payout, alias.as_deref())
                .await
                .map(Outcome::Profile),
            Instruction::SetupTags => self.setup_tags(caller).await.map(Outcome::Initialized),
            Instruction::SubmitPost {
                tag_index,
                post_identity,
                content,
                explicit_tag,
            } => self
                .submit_post(caller, *tag_index, post_identity, content, explicit_tag.as_ref())
                .await
                .map(Outcome::Post),
            Instruction::IncrementLike { post } => {
                let count = self.increment_like(post).await?;
                Ok(Outcome::Liked { post: *post, count })
            }
            Instruction::LikePost { post } => {
                let count = self.like_post(caller, post).await?;
                Ok(Outcome::Liked { post: *post, count })
            }
            Instruction::CreateGroupProfile { payout } => self
                .create_group_profile(caller, payout)
                .await
                .map(Outcome::Group),
            Instruction::SubmitReply {
                reply_identity,
                post,
                content,
            } => self
                .submit_reply(caller, reply_identity, post, content)
                .await
                .map(Outcome::Reply),
            Instruction::FollowUser { uid } => {
                self.follow_user(caller, *uid).await.map(Outcome::Followed)
            }
            Instruction::JoinGroup { gid } => self.join_group(caller, *gid).await.map(Outcome::Joined),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Singletons
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the Registry. Runs once; a second call changes nothing.
    pub async fn setup_spling(&self, caller: &Identity) -> Result<Address> {
        let (address, bump) = self.singletons.registry;
        self.create_singleton(address, bump, &Registry::new(*caller), "registry")
            .await?;
        tracing::info!(%address, authority = %caller, "registry initialized");
        Ok(address)
    }

    /// Create the Treasury. Requires the Registry.
    pub async fn create_bank(&self, caller: &Identity) -> Result<Address> {
        self.require::<Registry>(&self.singletons.registry.0, Dependency::Registry)
            .await?;

        let (address, bump) = self.singletons.treasury;
        let treasury = Treasury {
            authority: *caller,
            balance: 0,
        };
        self.create_singleton(address, bump, &treasury, "treasury")
            .await?;
        tracing::info!(%address, "treasury initialized");
        Ok(address)
    }

    /// Create the empty TagRegistry. Requires the Registry.
    pub async fn setup_tags(&self, _caller: &Identity) -> Result<Address> {
        self.require::<Registry>(&self.singletons.registry.0, Dependency::Registry)
            .await?;

        let (address, bump) = self.singletons.tags;
        self.create_singleton(address, bump, &TagRegistry::default(), "tag registry")
            .await?;
        tracing::info!(%address, "tag registry initialized");
        Ok(address)
    }

    async fn create_singleton<T: Account>(
        &self,
        address: Address,
        bump: u8,
        body: &T,
        name: &'static str,
    ) -> Result<()> {
        let batch = WriteBatch::new().create(self.new_record(address, bump, body)?);
        match self.store.commit(&batch).await? {
            CommitResult::Committed => Ok(()),
            CommitResult::Occupied(_) => Err(LedgerError::AlreadyInitialized(name)),
            CommitResult::Stale(at) => Err(self.contention(at)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profiles
    // ─────────────────────────────────────────────────────────────────────────

    /// Create the caller's profile and assign the next uid.
    pub async fn create_user_profile(
        &self,
        caller: &Identity,
        payout: &Identity,
        alias: Option<&str>,
    ) -> Result<ProfileReceipt> {
        self.require_setup().await?;

        let (address, bump) = profile_address(&self.config.program_id, caller)?;
        let alias = normalize_alias(alias, &self.limits)?;

        let _writer = self.store.write_gate().enter().await;
        if self.store.has_account(&address).await? {
            return Err(LedgerError::DuplicateProfile(address));
        }

        self.payments.before_profile_created(&address, payout).await?;

        let registry_address = self.singletons.registry.0;
        for attempt in 1..=self.config.max_commit_attempts {
            let (registry_record, mut registry) = self
                .require::<Registry>(&registry_address, Dependency::Registry)
                .await?;
            let uid = registry
                .users
                .checked_add(1)
                .ok_or(LedgerError::CounterOverflow(registry_address))?;
            registry.users = uid;

            let profile = Profile {
                owner: *caller,
                uid,
                payout: *payout,
                alias: alias.clone(),
                status: STATUS_ACTIVE,
                created_at: self.clock.now_millis(),
            };
            let batch = WriteBatch::new()
                .create(self.new_record(address, bump, &profile)?)
                .update(Self::updated(&registry_record, &registry)?);

            match self.store.commit(&batch).await? {
                CommitResult::Committed => {
                    tracing::info!(%address, uid, owner = %caller, "profile created");
                    return Ok(ProfileReceipt { address, uid });
                }
                CommitResult::Occupied(_) => return Err(LedgerError::DuplicateProfile(address)),
                CommitResult::Stale(at) => {
                    tracing::debug!(attempt, %at, "registry moved, retrying profile");
                }
            }
        }

        Err(self.contention(registry_address))
    }

    /// Create the caller's group profile and assign the next gid.
    pub async fn create_group_profile(
        &self,
        caller: &Identity,
        payout: &Identity,
    ) -> Result<GroupReceipt> {
        self.require_setup().await?;

        let (address, bump) = group_address(&self.config.program_id, caller)?;

        let _writer = self.store.write_gate().enter().await;
        if self.store.has_account(&address).await? {
            return Err(LedgerError::DuplicateGroup(address));
        }

        let registry_address = self.singletons.registry.0;
        for attempt in 1..=self.config.max_commit_attempts {
            let (registry_record, mut registry) = self
                .require::<Registry>(&registry_address, Dependency::Registry)
                .await?;
            let gid = registry
                .groups
                .checked_add(1)
                .ok_or(LedgerError::CounterOverflow(registry_address))?;
            registry.groups = gid;

            let group = GroupProfile {
                owner: *caller,
                gid,
                payout: *payout,
                status: STATUS_ACTIVE,
                created_at: self.clock.now_millis(),
            };
            let batch = WriteBatch::new()
                .create(self.new_record(address, bump, &group)?)
                .update(Self::updated(&registry_record, &registry)?);

            match self.store.commit(&batch).await? {
                CommitResult::Committed => {
                    tracing::info!(%address, gid, owner = %caller, "group profile created");
                    return Ok(GroupReceipt { address, gid });
                }
                CommitResult::Occupied(_) => return Err(LedgerError::DuplicateGroup(address)),
                CommitResult::Stale(at) => {
                    tracing::debug!(attempt, %at, "registry moved, retrying group profile");
                }
            }
        }

        Err(self.contention(registry_address))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn registry(&self) -> Result<Option<Registry>> {
        self.read(&self.singletons.registry.0).await
    }

    pub async fn treasury(&self) -> Result<Option<Treasury>> {
        self.read(&self.singletons.treasury.0).await
    }

    pub async fn tag_registry(&self) -> Result<Option<TagRegistry>> {
        self.read(&self.singletons.tags.0).await
    }

    pub async fn profile(&self, owner: &Identity) -> Result<Option<Profile>> {
        let (address, _) = profile_address(&self.config.program_id, owner)?;
        self.read(&address).await
    }

    pub async fn group_profile(&self, owner: &Identity) -> Result<Option<GroupProfile>> {
        let (address, _) = group_address(&self.config.program_id, owner)?;
        self.read(&address).await
    }

    pub async fn post(&self, address: &Address) -> Result<Option<Post>> {
        self.read(address).await
    }

    pub async fn reply(&self, address: &Address) -> Result<Option<Reply>> {
        self.read(address).await
    }

    /// The like a profile gave a post through `like_post`, if any.
    pub async fn profile_like(&self, post: &Address, uid: u64) -> Result<Option<Like>> {
        let (address, _) = like_address(&self.config.program_id, post, uid)?;
        self.read(&address).await
    }

    /// Whether `follower` follows the profile numbered `uid`.
    pub async fn follow(&self, follower: &Identity, uid: u64) -> Result<Option<Follow>> {
        let (address, _) = follow_address(&self.config.program_id, follower, uid)?;
        self.read(&address).await
    }

    /// `member`'s membership in group `gid`, if any.
    pub async fn membership(&self, member: &Identity, gid: u64) -> Result<Option<Membership>> {
        let (address, _) = membership_address(&self.config.program_id, member, gid)?;
        self.read(&address).await
    }

    /// The like counter of a post.
    pub async fn likes(&self, post: &Address) -> Result<Option<Likes>> {
        let (address, _) =
            spling_core::address::likes_address(&self.config.program_id, post)?;
        self.read(&address).await
    }

    /// Every post, ordered by address.
    pub async fn posts(&self) -> Result<Vec<(Address, Post)>> {
        self.store
            .accounts_by_kind(AccountKind::Post)
            .await?
            .into_iter()
            .filter(|record| record.owner == self.config.program_id)
            .map(|record| -> Result<(Address, Post)> {
                Ok((record.address, Post::decode(&record.data)?))
            })
            .collect()
    }

    /// The raw stored account at an address.
    pub async fn account(&self, address: &Address) -> Result<Option<AccountRecord>> {
        Ok(self.store.get_account(address).await?)
    }

    /// Blake3 over every account in address order.
    ///
    /// Two ledgers that applied the same instructions under the same clock
    /// have the same state hash.
    pub async fn state_hash(&self) -> Result<Blake3Hash> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"spling-state-v0");

        for record in self.store.all_accounts().await? {
            hasher.update(record.address.as_bytes());
            hasher.update(record.owner.as_bytes());
            hasher.update(&record.kind.to_le_bytes());
            hasher.update(&[record.bump]);
            hasher.update(&record.revision.to_le_bytes());
            hasher.update(&(record.data.len() as u64).to_le_bytes());
            hasher.update(&record.data);
        }

        Ok(Blake3Hash::from_bytes(*hasher.finalize().as_bytes()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Registry then Treasury, in that order.
    pub(crate) async fn require_setup(&self) -> Result<()> {
        self.require::<Registry>(&self.singletons.registry.0, Dependency::Registry)
            .await?;
        self.require::<Treasury>(&self.singletons.treasury.0, Dependency::Treasury)
            .await?;
        Ok(())
    }

    pub(crate) async fn read<T: Account>(&self, address: &Address) -> Result<Option<T>> {
        Ok(self.load::<T>(address).await?.map(|(_, body)| body))
    }

    /// Load and decode a record, checking it is the expected kind.
    pub(crate) async fn load<T: Account>(
        &self,
        address: &Address,
    ) -> Result<Option<(AccountRecord, T)>> {
        let Some(record) = self.store.get_account(address).await? else {
            return Ok(None);
        };

        if record.owner != self.config.program_id {
            return Err(LedgerError::AccountMismatch {
                address: *address,
                reason: format!("owned by {}", record.owner),
            });
        }
        if record.kind != T::KIND.to_u16() {
            return Err(LedgerError::AccountMismatch {
                address: *address,
                reason: format!("kind {:#06x}, expected {:?}", record.kind, T::KIND),
            });
        }

        let body = T::decode(&record.data)?;
        Ok(Some((record, body)))
    }

    pub(crate) async fn require<T: Account>(
        &self,
        address: &Address,
        missing: Dependency,
    ) -> Result<(AccountRecord, T)> {
        self.load::<T>(address)
            .await?
            .ok_or(LedgerError::DependencyMissing(missing))
    }

    pub(crate) fn new_record<T: Account>(
        &self,
        address: Address,
        bump: u8,
        body: &T,
    ) -> Result<AccountRecord> {
        Ok(AccountRecord::new(
            address,
            self.config.program_id,
            T::KIND,
            bump,
            body.encode()?,
        ))
    }

    pub(crate) fn updated<T: Account>(record: &AccountRecord, body: &T) -> Result<AccountRecord> {
        Ok(record.with_data(body.encode()?))
    }

    pub(crate) fn contention(&self, address: Address) -> LedgerError {
        tracing::warn!(%address, attempts = self.config.max_commit_attempts, "giving up after contention");
        LedgerError::Contention {
            address,
            attempts: self.config.max_commit_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ThreadProgram;
    use crate::payments::PaymentError;
    use spling_core::{CoreError, Keypair, ProgramId};
    use spling_store::MemoryStore;

    fn ledger() -> Ledger<MemoryStore, ThreadProgram> {
        let config = LedgerConfig::default();
        let threads = ThreadProgram::new(config.thread_program_id);
        Ledger::new(MemoryStore::new(), threads, config).unwrap()
    }

    struct FutureRail;

    #[async_trait::async_trait]
    impl PaymentRail for FutureRail {
        fn name(&self) -> &'static str {
            "future"
        }

        fn interface_version(&self) -> u32 {
            PAYMENT_INTERFACE_VERSION + 1
        }

        async fn before_profile_created(
            &self,
            _profile: &Address,
            _payout: &Identity,
        ) -> std::result::Result<(), PaymentError> {
            Ok(())
        }
    }

    struct RefusingRail;

    #[async_trait::async_trait]
    impl PaymentRail for RefusingRail {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn interface_version(&self) -> u32 {
            PAYMENT_INTERFACE_VERSION
        }

        async fn before_profile_created(
            &self,
            _profile: &Address,
            _payout: &Identity,
        ) -> std::result::Result<(), PaymentError> {
            Err(PaymentError::Rejected("no".into()))
        }
    }

    #[derive(Default)]
    struct CountingRail {
        calls: Arc<std::sync::atomic::AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl PaymentRail for CountingRail {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn interface_version(&self) -> u32 {
            PAYMENT_INTERFACE_VERSION
        }

        async fn before_profile_created(
            &self,
            _profile: &Address,
            _payout: &Identity,
        ) -> std::result::Result<(), PaymentError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_payment_hook_only_sees_profiles_that_land() {
        let rail = CountingRail::default();
        let calls = Arc::clone(&rail.calls);
        let ledger = Arc::new(ledger().with_payments(rail).unwrap());
        let admin = Keypair::from_seed(&[1; 32]).identity();
        ledger.setup_spling(&admin).await.unwrap();
        ledger.create_bank(&admin).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move { ledger.create_user_profile(&admin, &admin, None).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(LedgerError::DuplicateProfile(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(ledger.registry().await.unwrap().unwrap().users, 1);
    }

    #[test]
    fn test_mismatched_payment_rail_is_refused() {
        let result = ledger().with_payments(FutureRail);
        assert!(matches!(
            result,
            Err(LedgerError::UnsupportedExtension {
                found: 1,
                expected: 0,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_payment_hook_failure_aborts_profile() {
        let ledger = ledger().with_payments(RefusingRail).unwrap();
        let admin = Keypair::from_seed(&[1; 32]).identity();
        ledger.setup_spling(&admin).await.unwrap();
        ledger.create_bank(&admin).await.unwrap();

        let result = ledger.create_user_profile(&admin, &admin, None).await;
        assert!(matches!(result, Err(LedgerError::Payment(_))));
        assert_eq!(ledger.registry().await.unwrap().unwrap().users, 0);
        assert!(ledger.profile(&admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_singleton_is_created_once() {
        let ledger = ledger();
        let admin = Keypair::from_seed(&[1; 32]).identity();

        let address = ledger.setup_spling(&admin).await.unwrap();
        assert_eq!(address, ledger.registry_address());
        let before = ledger.state_hash().await.unwrap();

        assert!(matches!(
            ledger.setup_spling(&admin).await,
            Err(LedgerError::AlreadyInitialized("registry"))
        ));
        assert_eq!(ledger.state_hash().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_foreign_record_is_a_mismatch() {
        let ledger = ledger();
        let foreign = AccountRecord::new(
            ledger.registry_address(),
            ProgramId::from_bytes([7; 32]),
            AccountKind::Registry,
            255,
            Registry::new(Identity::from_bytes([0; 32])).encode().unwrap(),
        );
        ledger
            .store()
            .commit(&WriteBatch::new().create(foreign))
            .await
            .unwrap();

        assert!(matches!(
            ledger.registry().await,
            Err(LedgerError::AccountMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_wrong_kind_is_a_mismatch() {
        let ledger = ledger();
        let admin = Keypair::from_seed(&[1; 32]).identity();
        ledger.setup_spling(&admin).await.unwrap();

        // The registry address does not hold a post.
        assert!(matches!(
            ledger.post(&ledger.registry_address()).await,
            Err(LedgerError::AccountMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_config_is_refused() {
        let config = LedgerConfig {
            max_commit_attempts: 0,
            ..Default::default()
        };
        let threads = ThreadProgram::new(config.thread_program_id);
        assert!(matches!(
            Ledger::new(MemoryStore::new(), threads, config),
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn test_core_error_conversion_is_wired() {
        let e: LedgerError = CoreError::AddressExhausted.into();
        assert!(matches!(e, LedgerError::AddressExhausted));
    }
}
