//! Error types for Spling Core.

use thiserror::Error;

/// Core errors from derivation, encoding and signature checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("no viable bump seed found for the given seeds")]
    AddressExhausted,

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("derived address lies on the ed25519 curve")]
    OnCurve,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid text encoding: {0}")]
    InvalidEncoding(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("unknown account kind: {0:#06x}")]
    UnknownAccountKind(u16),
}

/// Validation errors for instruction arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("content is {len} bytes, maximum is {max}")]
    ContentTooLong { len: usize, max: usize },

    #[error("invalid alias: {0}")]
    InvalidAlias(String),

    #[error("invalid tag name: {0:?}")]
    InvalidTagName(String),

    #[error("signature verification failed")]
    SignatureFailed,
}
