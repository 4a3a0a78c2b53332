//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use spling_core::{AccountKind, Address};

use crate::error::{Result, StoreError};
use crate::traits::{
    first_conflict, AccountRecord, CommitResult, Mutation, Store, WriteBatch, WriteGate,
};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    /// Accounts keyed by address; BTreeMap keeps address order.
    accounts: RwLock<BTreeMap<Address, AccountRecord>>,
    gate: WriteGate,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            gate: WriteGate::new(),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<Address, AccountRecord>>> {
        self.accounts
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<Address, AccountRecord>>> {
        self.accounts
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn write_gate(&self) -> &WriteGate {
        &self.gate
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<CommitResult> {
        batch.check_shape()?;
        let mut accounts = self.write()?;

        if let Some(conflict) =
            first_conflict(batch, |address| Ok(accounts.get(address).map(|r| r.revision)))?
        {
            return Ok(conflict);
        }

        for mutation in batch.mutations() {
            match mutation {
                Mutation::Create(record) => {
                    let mut record = record.clone();
                    record.revision = 1;
                    accounts.insert(record.address, record);
                }
                Mutation::Update {
                    record,
                    expected_revision,
                } => {
                    let mut record = record.clone();
                    record.revision = expected_revision + 1;
                    accounts.insert(record.address, record);
                }
            }
        }

        Ok(CommitResult::Committed)
    }

    async fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>> {
        Ok(self.read()?.get(address).cloned())
    }

    async fn has_account(&self, address: &Address) -> Result<bool> {
        Ok(self.read()?.contains_key(address))
    }

    async fn accounts_by_kind(&self, kind: AccountKind) -> Result<Vec<AccountRecord>> {
        let kind = kind.to_u16();
        Ok(self
            .read()?
            .values()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect())
    }

    async fn all_accounts(&self) -> Result<Vec<AccountRecord>> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spling_core::ProgramId;

    fn record(byte: u8, kind: AccountKind) -> AccountRecord {
        AccountRecord::new(
            Address::from_bytes([byte; 32]),
            ProgramId::from_bytes([0x11; 32]),
            kind,
            254,
            vec![byte; 4],
        )
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new().create(record(1, AccountKind::Registry));

        assert_eq!(store.commit(&batch).await.unwrap(), CommitResult::Committed);

        let stored = store
            .get_account(&Address::from_bytes([1; 32]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.revision, 1);
        assert_eq!(stored.bump, 254);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_on_occupied_address_applies_nothing() {
        let store = MemoryStore::new();
        store
            .commit(&WriteBatch::new().create(record(1, AccountKind::Registry)))
            .await
            .unwrap();

        let batch = WriteBatch::new()
            .create(record(2, AccountKind::Post))
            .create(record(1, AccountKind::Registry));
        assert_eq!(
            store.commit(&batch).await.unwrap(),
            CommitResult::Occupied(Address::from_bytes([1; 32]))
        );
        assert!(!store.has_account(&Address::from_bytes([2; 32])).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_bumps_revision_and_rejects_stale() {
        let store = MemoryStore::new();
        store
            .commit(&WriteBatch::new().create(record(5, AccountKind::Likes)))
            .await
            .unwrap();
        let read = store
            .get_account(&Address::from_bytes([5; 32]))
            .await
            .unwrap()
            .unwrap();

        let first = WriteBatch::new().update(read.with_data(vec![1]));
        assert!(store.commit(&first).await.unwrap().is_committed());

        // Same read revision again: someone else got there first.
        let second = WriteBatch::new().update(read.with_data(vec![2]));
        assert_eq!(
            store.commit(&second).await.unwrap(),
            CommitResult::Stale(read.address)
        );

        let stored = store.get_account(&read.address).await.unwrap().unwrap();
        assert_eq!(stored.revision, 2);
        assert_eq!(stored.data.as_ref(), &[1]);
    }

    #[tokio::test]
    async fn test_update_of_missing_account_is_stale() {
        let store = MemoryStore::new();
        let mut ghost = record(9, AccountKind::Likes);
        ghost.revision = 1;
        assert_eq!(
            store.commit(&WriteBatch::new().update(ghost)).await.unwrap(),
            CommitResult::Stale(Address::from_bytes([9; 32]))
        );
    }

    #[tokio::test]
    async fn test_accounts_are_address_ordered() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .create(record(3, AccountKind::Post))
            .create(record(1, AccountKind::Post))
            .create(record(2, AccountKind::Likes));
        store.commit(&batch).await.unwrap();

        let all: Vec<u8> = store
            .all_accounts()
            .await
            .unwrap()
            .iter()
            .map(|r| r.address.as_bytes()[0])
            .collect();
        assert_eq!(all, vec![1, 2, 3]);

        let posts = store.accounts_by_kind(AccountKind::Post).await.unwrap();
        assert_eq!(posts.len(), 2);
    }

    proptest! {
        #[test]
        fn test_each_address_is_created_once(bytes in prop::collection::vec(0u8..8, 1..24)) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async {
                let store = MemoryStore::new();
                let mut seen = std::collections::BTreeSet::new();

                for byte in &bytes {
                    let batch = WriteBatch::new().create(record(*byte, AccountKind::Post));
                    let result = store.commit(&batch).await.unwrap();
                    assert_eq!(result.is_committed(), seen.insert(*byte));
                }

                assert_eq!(store.count().await.unwrap(), seen.len() as u64);
            });
        }
    }
}
