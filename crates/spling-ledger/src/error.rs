//! Error types for the ledger.

use spling_core::{Address, CoreError, ValidationError};
use spling_store::StoreError;
use thiserror::Error;

use crate::bridge::BridgeError;
use crate::config::ConfigError;
use crate::payments::PaymentError;

/// Which record an instruction needed but did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Registry,
    Treasury,
    Profile,
    TagRegistry,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Registry => "registry",
            Self::Treasury => "treasury",
            Self::Profile => "profile",
            Self::TagRegistry => "tag registry",
        })
    }
}

/// Errors that can occur during ledger operations.
///
/// Every error leaves stored state exactly as it was before the instruction.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A singleton was set up twice.
    #[error("{0} already initialized")]
    AlreadyInitialized(&'static str),

    /// A prerequisite record does not exist yet.
    #[error("missing dependency: {0}")]
    DependencyMissing(Dependency),

    #[error("profile already exists at {0}")]
    DuplicateProfile(Address),

    #[error("group profile already exists at {0}")]
    DuplicateGroup(Address),

    #[error("post already exists at {0}")]
    DuplicatePost(Address),

    #[error("reply already exists at {0}")]
    DuplicateReply(Address),

    #[error("post not found: {0}")]
    PostNotFound(Address),

    #[error("no profile with uid {0}")]
    UserNotFound(u64),

    #[error("no group with gid {0}")]
    GroupNotFound(u64),

    #[error("already following uid {uid}")]
    DuplicateFollow { uid: u64 },

    #[error("already a member of group {gid}")]
    AlreadyMember { gid: u64 },

    #[error("unknown tag: {0}")]
    UnknownTag(String),

    #[error("tag registry is full ({0} tags)")]
    TagRegistryFull(usize),

    #[error("content is {len} bytes, maximum is {max}")]
    ContentTooLong { len: usize, max: usize },

    #[error("invalid alias: {0}")]
    InvalidAlias(String),

    #[error("profile {uid} already liked {post}")]
    AlreadyLiked { post: Address, uid: u64 },

    #[error("like counter overflow at {0}")]
    CounterOverflow(Address),

    /// No bump in the search space yields an off-curve address.
    #[error("address space exhausted for derivation")]
    AddressExhausted,

    /// The thread protocol failed, refused, or returned the wrong address.
    #[error("external call failed: {0}")]
    ExternalCallFailed(#[from] BridgeError),

    #[error("invalid signature")]
    InvalidSignature,

    /// Optimistic retries ran out.
    #[error("contention on {address} after {attempts} attempts")]
    Contention { address: Address, attempts: u32 },

    /// A stored record is not what its address says it is.
    #[error("account mismatch at {address}: {reason}")]
    AccountMismatch { address: Address, reason: String },

    #[error("unsupported extension: {name} interface version {found}, expected {expected}")]
    UnsupportedExtension {
        name: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("payment rail error: {0}")]
    Payment(#[from] PaymentError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(CoreError),
}

impl From<CoreError> for LedgerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::AddressExhausted => Self::AddressExhausted,
            CoreError::InvalidSignature | CoreError::InvalidPublicKey => Self::InvalidSignature,
            other => Self::Core(other),
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::ContentTooLong { len, max } => Self::ContentTooLong { len, max },
            ValidationError::InvalidAlias(reason) => Self::InvalidAlias(reason),
            ValidationError::InvalidTagName(name) => Self::UnknownTag(name),
            ValidationError::SignatureFailed => Self::InvalidSignature,
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
