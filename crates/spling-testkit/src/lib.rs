//! # Spling Testkit
//!
//! Testing utilities for the Spling ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known derivations with expected addresses, for checking
//!   that clients in other languages land on the same records
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A bootstrapped in-memory ledger for integration tests
//!
//! ## Golden Vectors
//!
//! ```rust
//! use spling_testkit::vectors::{all_vectors, derive_vector};
//!
//! for vector in all_vectors() {
//!     let (address, bump) = derive_vector(&vector).unwrap();
//!     println!("{}: {} (bump {})", vector.name, address, bump);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use spling_testkit::generators::{PostParams, instruction_from_params};
//!
//! proptest! {
//!     #[test]
//!     fn instruction_id_is_deterministic(params: PostParams) {
//!         let a = instruction_from_params(&params).unwrap();
//!         let b = instruction_from_params(&params).unwrap();
//!         prop_assert_eq!(a.id().unwrap(), b.id().unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use spling_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::bootstrapped().await?;
//! let receipt = fixture.post("hello").await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_keypairs, TestFixture, TestLedger, FIXTURE_EPOCH_MILLIS};
pub use generators::{instruction_from_params, PostParams};
pub use vectors::{all_vectors, derive_vector, verify_all_vectors, Derivation, GoldenVector};
