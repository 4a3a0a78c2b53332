//! Store trait: the abstract interface for account persistence.
//!
//! This trait allows the ledger to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use std::collections::HashSet;

use async_trait::async_trait;
use bytes::Bytes;
use spling_core::{AccountKind, Address, ProgramId};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{Result, StoreError};

/// A stored account: one record at one derived address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Where the record lives.
    pub address: Address,
    /// Program the address was derived under.
    pub owner: ProgramId,
    /// [`AccountKind`] discriminator.
    pub kind: u16,
    /// Bump found during derivation.
    pub bump: u8,
    /// Starts at 1 and increases by one on every update.
    pub revision: u64,
    /// Encoded record body.
    pub data: Bytes,
}

impl AccountRecord {
    /// Build a record for a fresh create. The store assigns the revision.
    pub fn new(
        address: Address,
        owner: ProgramId,
        kind: AccountKind,
        bump: u8,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            address,
            owner,
            kind: kind.to_u16(),
            bump,
            revision: 0,
            data: data.into(),
        }
    }

    /// The decoded kind, if known.
    pub fn account_kind(&self) -> Option<AccountKind> {
        AccountKind::from_u16(self.kind)
    }

    /// Same record with a new body, for an update.
    pub fn with_data(&self, data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..self.clone()
        }
    }
}

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create a record. Fails the batch if the address is occupied.
    Create(AccountRecord),
    /// Replace a record's body. Fails the batch unless the stored revision
    /// equals `expected_revision`.
    Update {
        record: AccountRecord,
        expected_revision: u64,
    },
}

impl Mutation {
    pub fn address(&self) -> &Address {
        match self {
            Self::Create(record) => &record.address,
            Self::Update { record, .. } => &record.address,
        }
    }
}

/// A set of mutations applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a create.
    pub fn create(mut self, record: AccountRecord) -> Self {
        self.mutations.push(Mutation::Create(record));
        self
    }

    /// Add a revision-checked update. `record.revision` is the revision read.
    pub fn update(mut self, record: AccountRecord) -> Self {
        let expected_revision = record.revision;
        self.mutations.push(Mutation::Update {
            record,
            expected_revision,
        });
        self
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Reject batches that touch one address twice.
    pub fn check_shape(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.mutations.len());
        for mutation in &self.mutations {
            if !seen.insert(*mutation.address()) {
                return Err(StoreError::InvalidBatch(format!(
                    "address {} written twice",
                    mutation.address()
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// Every mutation was applied.
    Committed,
    /// A create hit an existing record. Nothing was applied.
    Occupied(Address),
    /// An update saw a different revision, or no record. Nothing was applied.
    Stale(Address),
}

impl CommitResult {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Serializes read-modify-write cycles on one store.
///
/// A writer that reads records, derives new bodies from them and commits
/// holds the gate for the whole cycle. Writers that share the gate never
/// see each other's revision checks fail.
#[derive(Debug, Default)]
pub struct WriteGate {
    lock: Mutex<()>,
}

/// Held for the duration of one read-modify-write cycle.
pub type WriteGuard<'a> = MutexGuard<'a, ()>;

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for every other writer to finish, then enter.
    pub async fn enter(&self) -> WriteGuard<'_> {
        self.lock.lock().await
    }
}

/// Check every mutation against current revisions before anything is written.
///
/// `revision_of` returns the stored revision for an address, if any.
pub(crate) fn first_conflict<F>(batch: &WriteBatch, mut revision_of: F) -> Result<Option<CommitResult>>
where
    F: FnMut(&Address) -> Result<Option<u64>>,
{
    for mutation in batch.mutations() {
        match mutation {
            Mutation::Create(record) => {
                if revision_of(&record.address)?.is_some() {
                    return Ok(Some(CommitResult::Occupied(record.address)));
                }
            }
            Mutation::Update {
                record,
                expected_revision,
            } => {
                if revision_of(&record.address)? != Some(*expected_revision) {
                    return Ok(Some(CommitResult::Stale(record.address)));
                }
            }
        }
    }
    Ok(None)
}

/// The Store trait: async interface for account persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Atomic batches**: `commit` validates every mutation before applying any.
/// - **Optimistic concurrency**: updates carry the revision they read; a
///   concurrent writer makes the batch `Stale` instead of losing an update.
/// - **Serialized writers**: ledger writers hold [`Store::write_gate`] from
///   their first read to their commit, so `Stale` only comes from writers
///   that bypass the gate.
/// - **No deletes**: records, once created, stay.
#[async_trait]
pub trait Store: Send + Sync {
    /// The gate shared by every writer of this store.
    fn write_gate(&self) -> &WriteGate;

    /// Apply a batch atomically.
    ///
    /// Conflicts are reported as [`CommitResult`] values, not errors.
    async fn commit(&self, batch: &WriteBatch) -> Result<CommitResult>;

    /// Get an account by address.
    async fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>>;

    /// Check if an account exists.
    async fn has_account(&self, address: &Address) -> Result<bool>;

    /// Every account of one kind, ordered by address.
    async fn accounts_by_kind(&self, kind: AccountKind) -> Result<Vec<AccountRecord>>;

    /// Every account, ordered by address.
    async fn all_accounts(&self) -> Result<Vec<AccountRecord>>;

    /// Number of stored accounts.
    async fn count(&self) -> Result<u64>;
}
