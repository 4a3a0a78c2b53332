//! Cryptographic primitives for the Spling ledger.
//!
//! Wraps Ed25519 signing and Blake3 hashing with strong types.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::CoreError;
use crate::types::bytes32;

bytes32!(
    /// A participant's Ed25519 public key.
    ///
    /// This answers "who owns this": profile owners, post authors and payout
    /// destinations are all identities.
    Identity,
    "Identity"
);

impl Identity {
    /// Check `signature` over `message` against this identity.
    ///
    /// An identity that is not a curve point cannot have signed anything and
    /// fails with `InvalidPublicKey`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CoreError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|_| CoreError::InvalidPublicKey)?
            .verify(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
            .map_err(|_| CoreError::InvalidSignature)
    }
}

/// Whether 32 bytes decode to a point on the Ed25519 curve.
///
/// Derived addresses must be off-curve so that no private key can ever
/// sign for them.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

bytes32!(
    /// A 32-byte Blake3 digest.
    Blake3Hash,
    "Blake3"
);

impl Blake3Hash {
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }
}

/// A 64-byte Ed25519 signature over a signed message.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// All zeroes. Never verifies; stands in for a missing signature.
    pub const ZERO: Self = Self([0u8; 64]);

    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..8]))
    }
}

/// A participant keypair.
///
/// Custody of keys is a client concern; the ledger only ever sees the
/// [`Identity`] and signatures. This type exists for clients and tests.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// Deterministic keypair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.identity())
    }
}
