//! On-disk behavior of the SQLite backend.

use spling_core::{AccountKind, Address, ProgramId};
use spling_store::{AccountRecord, CommitResult, SqliteStore, Store, WriteBatch};

fn record(byte: u8) -> AccountRecord {
    AccountRecord::new(
        Address::from_bytes([byte; 32]),
        ProgramId::from_bytes([0x22; 32]),
        AccountKind::Post,
        250,
        format!("body {}", byte).into_bytes(),
    )
}

#[tokio::test]
async fn test_accounts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spling.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        let batch = WriteBatch::new().create(record(1)).create(record(2));
        assert_eq!(store.commit(&batch).await.unwrap(), CommitResult::Committed);
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.count().await.unwrap(), 2);

    let stored = store
        .get_account(&Address::from_bytes([2; 32]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.data.as_ref(), b"body 2");
    assert_eq!(stored.owner, ProgramId::from_bytes([0x22; 32]));

    // A reopened store still refuses to recreate.
    assert_eq!(
        store.commit(&WriteBatch::new().create(record(1))).await.unwrap(),
        CommitResult::Occupied(Address::from_bytes([1; 32]))
    );
}

#[tokio::test]
async fn test_concurrent_updates_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(SqliteStore::open(dir.path().join("cas.db")).unwrap());
    store
        .commit(&WriteBatch::new().create(record(7)))
        .await
        .unwrap();
    let read = store
        .get_account(&Address::from_bytes([7; 32]))
        .await
        .unwrap()
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let store = store.clone();
        let read = read.clone();
        handles.push(tokio::spawn(async move {
            store
                .commit(&WriteBatch::new().update(read.with_data(vec![i])))
                .await
                .unwrap()
        }));
    }

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap().is_committed() {
            committed += 1;
        }
    }

    // Every writer read revision 1, so exactly one wins.
    assert_eq!(committed, 1);
    let stored = store.get_account(&read.address).await.unwrap().unwrap();
    assert_eq!(stored.revision, 2);
}
