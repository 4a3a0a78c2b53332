//! # Spling Core
//!
//! Pure primitives for the Spling ledger: identities, deterministic address
//! derivation, record layouts, and signed instructions.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over fixed-size identifiers and deterministic encodings.
//!
//! ## Key Types
//!
//! - [`Address`] - A derived record address (never chosen by a caller)
//! - [`ProgramId`] - The identity of a protocol that owns derived addresses
//! - [`Identity`] - A participant's Ed25519 public key
//! - [`PostIdentity`] - A one-time value that names a post or reply address
//! - [`Account`] - The body of a stored record, tagged by [`AccountKind`]
//! - [`SignedInstruction`] - An instruction plus its signer's signature
//!
//! ## Address derivation
//!
//! Addresses are derived from ordered byte-string seeds plus an owning
//! program id. See the [`address`] module for the scheme and the fixed seed
//! literals that make up the wire contract.

pub mod account;
pub mod address;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod instruction;
pub mod types;
pub mod validation;

pub use account::{
    Account, AccountKind, Follow, GroupProfile, Like, Likes, Membership, Post, Profile, Registry,
    Reply, TagRegistry, Treasury, STATUS_ACTIVE,
};
pub use address::{create_program_address, find_program_address, seeds, MAX_SEEDS, MAX_SEED_LEN};
pub use canonical::{canonical_instruction_bytes, signed_message};
pub use crypto::{Blake3Hash, Identity, Keypair, Signature};
pub use error::{CoreError, ValidationError};
pub use instruction::{Instruction, InstructionId, SignedInstruction, TagRef};
pub use types::{Address, PostIdentity, ProgramId};
pub use validation::{normalize_alias, normalize_tag, validate_content, validate_signature, Limits};
