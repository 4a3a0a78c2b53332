//! Strong type definitions for the Spling ledger.
//!
//! All 32-byte identifiers are newtypes to prevent misuse at compile time:
//! an [`Address`] names a record, a [`ProgramId`] names the protocol that
//! owns derived addresses, and a [`PostIdentity`] is a throwaway value that
//! only exists to make a post address unique.

use crate::error::CoreError;

/// Declares a 32-byte newtype with hex/base58 helpers.
macro_rules! bytes32 {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Convert to hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Convert to base58, the text form clients exchange.
            pub fn to_base58(&self) -> String {
                bs58::encode(self.0).into_string()
            }

            /// Parse from base58.
            pub fn from_base58(s: &str) -> Result<Self, $crate::error::CoreError> {
                $crate::types::decode_base58(s).map(Self)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($label, "({})"), self.to_base58())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.to_base58())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_base58(s)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }
    };
}

pub(crate) use bytes32;

bytes32!(
    /// A derived record address.
    ///
    /// Addresses are always the output of [`crate::find_program_address`];
    /// callers never pick them.
    Address,
    "Address"
);

bytes32!(
    /// The identity of a protocol that owns derived addresses.
    ProgramId,
    "ProgramId"
);

bytes32!(
    /// An ephemeral, freshly generated value that seeds a post or reply
    /// address.
    ///
    /// It carries no ownership meaning. Reusing one for a second post is a
    /// caller error that surfaces as a creation failure.
    PostIdentity,
    "PostIdentity"
);

impl PostIdentity {
    /// Generate a fresh random post identity.
    pub fn generate() -> Self {
        Self(rand::random())
    }
}

/// Decode a base58 string into exactly 32 bytes.
pub(crate) fn decode_base58(s: &str) -> Result<[u8; 32], CoreError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| CoreError::InvalidEncoding(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::InvalidEncoding(format!("expected 32 bytes, got {}", bytes.len())))
}
