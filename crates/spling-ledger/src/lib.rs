//! # Spling Ledger
//!
//! A social-content ledger over deterministic addresses: profiles, posts,
//! tags, likes, replies, and a thread root per post in an external
//! discussion-thread protocol.
//!
//! ## Key Concepts
//!
//! - **Derived addresses**: every record lives at an address computed from
//!   fixed seeds, so reads are direct lookups and duplicates collide.
//! - **Singletons**: the Registry, Treasury and TagRegistry exist at most
//!   once. Setting one up twice is an error that changes nothing.
//! - **Atomic instructions**: an instruction's writes land together or not
//!   at all, including when the thread protocol fails.
//! - **Relations as records**: likes by profile, follows and group
//!   memberships are each their own record, so profiles never change.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spling_ledger::{Ledger, LedgerConfig, ThreadProgram};
//! use spling_ledger::core::{Keypair, PostIdentity};
//! use spling_ledger::store::SqliteStore;
//!
//! async fn example() {
//!     let config = LedgerConfig::default();
//!     let threads = ThreadProgram::new(config.thread_program_id);
//!     let store = SqliteStore::open("spling.db").unwrap();
//!     let ledger = Ledger::new(store, threads, config).unwrap();
//!
//!     let me = Keypair::generate().identity();
//!     ledger.setup_spling(&me).await.unwrap();
//!     ledger.create_bank(&me).await.unwrap();
//!     ledger.create_user_profile(&me, &me, Some("spling")).await.unwrap();
//!     ledger.setup_tags(&me).await.unwrap();
//!
//!     let receipt = ledger
//!         .submit_post(&me, 1, &PostIdentity::generate(), "hello", None)
//!         .await
//!         .unwrap();
//!     ledger.increment_like(&receipt.post).await.unwrap();
//! }
//! ```

pub mod bridge;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod payments;
mod posts;
mod relations;

// Re-export component crates
pub use spling_core as core;
pub use spling_store as store;

pub use bridge::{BridgeError, ThreadBridge, ThreadProgram, ThreadRoot};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, LedgerConfig, DEFAULT_PROGRAM_ID, DEFAULT_THREAD_PROGRAM_ID};
pub use error::{Dependency, LedgerError, Result};
pub use ledger::{
    FollowReceipt, GroupReceipt, Ledger, MembershipReceipt, Outcome, PostReceipt, ProfileReceipt,
    ReplyReceipt,
};
pub use payments::{DisabledPayments, PaymentError, PaymentRail, PAYMENT_INTERFACE_VERSION};
