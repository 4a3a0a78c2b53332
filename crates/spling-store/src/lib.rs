//! # Spling Store
//!
//! Storage abstraction for the Spling ledger. Provides a trait-based
//! interface for account persistence with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`WriteBatch`] - Creates and revision-checked updates, applied together
//! - [`CommitResult`] - Whether a batch landed, and if not, which address blocked it
//! - [`WriteGate`] - Serializes read-modify-write cycles against one store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spling_store::{SqliteStore, Store, WriteBatch};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("spling.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let result = store.commit(&WriteBatch::new()).await.unwrap();
//!     assert!(result.is_committed());
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{
    AccountRecord, CommitResult, Mutation, Store, WriteBatch, WriteGate, WriteGuard,
};
