//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the Spling ledger. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use spling_core::{AccountKind, Address, ProgramId};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{
    first_conflict, AccountRecord, CommitResult, Mutation, Store, WriteBatch, WriteGate,
};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    gate: WriteGate,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            gate: WriteGate::new(),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            gate: WriteGate::new(),
        })
    }

    /// Run a blocking operation against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("connection mutex: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn blob32(row: &rusqlite::Row<'_>, idx: usize, name: &str) -> rusqlite::Result<[u8; 32]> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes
        .try_into()
        .map_err(|_| rusqlite::Error::InvalidColumnType(idx, name.into(), Type::Blob))
}

const SELECT_COLUMNS: &str = "SELECT address, owner, kind, bump, revision, data FROM accounts";

// Helper to convert a row to AccountRecord
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRecord> {
    let data: Vec<u8> = row.get(5)?;
    Ok(AccountRecord {
        address: Address::from_bytes(blob32(row, 0, "address")?),
        owner: ProgramId::from_bytes(blob32(row, 1, "owner")?),
        kind: row.get::<_, u16>(2)?,
        bump: row.get::<_, u8>(3)?,
        revision: row.get::<_, i64>(4)? as u64,
        data: Bytes::from(data),
    })
}

fn revision_at(conn: &Connection, address: &Address) -> Result<Option<u64>> {
    let revision: Option<i64> = conn
        .query_row(
            "SELECT revision FROM accounts WHERE address = ?1",
            params![address.as_bytes().as_slice()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(revision.map(|r| r as u64))
}

#[async_trait]
impl Store for SqliteStore {
    fn write_gate(&self) -> &WriteGate {
        &self.gate
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<CommitResult> {
        batch.check_shape()?;
        let batch = batch.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            if let Some(conflict) = first_conflict(&batch, |address| revision_at(&tx, address))? {
                // dropping the transaction rolls it back
                return Ok(conflict);
            }

            let now = now_millis();
            for mutation in batch.mutations() {
                match mutation {
                    Mutation::Create(record) => {
                        tx.execute(
                            "INSERT INTO accounts (
                                address, owner, kind, bump, revision, data, created_at, updated_at
                            ) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?6)",
                            params![
                                record.address.as_bytes().as_slice(),
                                record.owner.as_bytes().as_slice(),
                                record.kind as i64,
                                record.bump as i64,
                                record.data.as_ref(),
                                now,
                            ],
                        )?;
                    }
                    Mutation::Update {
                        record,
                        expected_revision,
                    } => {
                        let changed = tx.execute(
                            "UPDATE accounts SET data = ?1, revision = ?2, updated_at = ?3
                             WHERE address = ?4 AND revision = ?5",
                            params![
                                record.data.as_ref(),
                                (*expected_revision + 1) as i64,
                                now,
                                record.address.as_bytes().as_slice(),
                                *expected_revision as i64,
                            ],
                        )?;
                        if changed != 1 {
                            return Ok(CommitResult::Stale(record.address));
                        }
                    }
                }
            }

            tx.commit()?;
            Ok(CommitResult::Committed)
        })
        .await
    }

    async fn get_account(&self, address: &Address) -> Result<Option<AccountRecord>> {
        let address = *address;

        self.blocking(move |conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE address = ?1"),
                params![address.as_bytes().as_slice()],
                row_to_record,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn has_account(&self, address: &Address) -> Result<bool> {
        let address = *address;

        self.blocking(move |conn| Ok(revision_at(conn, &address)?.is_some()))
            .await
    }

    async fn accounts_by_kind(&self, kind: AccountKind) -> Result<Vec<AccountRecord>> {
        let kind = kind.to_u16() as i64;

        self.blocking(move |conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} WHERE kind = ?1 ORDER BY address"))?;
            let records = stmt
                .query_map(params![kind], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn all_accounts(&self) -> Result<Vec<AccountRecord>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY address"))?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
            Ok(n as u64)
        })
        .await
    }
}
