//! Golden address vectors.
//!
//! Clients derive record addresses on their own and must land exactly where
//! the ledger writes. Each vector pins one derivation under the default
//! program ids to its expected base58 address and bump.

use serde::Serialize;
use spling_core::address::{
    group_address, likes_address, post_address, profile_address, registry_address,
    reply_address, tags_address, thread_address, treasury_address,
};
use spling_core::{Address, CoreError, Identity, PostIdentity};
use spling_ledger::{DEFAULT_PROGRAM_ID, DEFAULT_THREAD_PROGRAM_ID};

/// Which derivation a vector exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Derivation {
    Registry,
    Treasury,
    Tags,
    Profile([u8; 32]),
    Group([u8; 32]),
    Post([u8; 32]),
    Reply([u8; 32]),
    /// Like counter of the post at this base58 address.
    Likes(&'static str),
    /// Thread root, under the thread program, of the post at this address.
    Thread(&'static str),
}

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub derivation: Derivation,
    /// Expected address (base58).
    pub expected_address: &'static str,
    pub expected_bump: u8,
}

const POST_OF_SEVENS: &str = "uG5tRSWQLNb7MgiiusShZLpCoHoNScrcXdpejc76Epk";

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "registry singleton",
            derivation: Derivation::Registry,
            expected_address: "FM3vxCpBueqBAbyJtTNYgVvqqpfU66vNQUG5vZTEbUVD",
            expected_bump: 255,
        },
        GoldenVector {
            name: "treasury singleton",
            derivation: Derivation::Treasury,
            expected_address: "9cfCiy8aPrit46tyXGkvLdMbatPANx1HgHWNSbgQeB65",
            expected_bump: 254,
        },
        GoldenVector {
            name: "tag registry singleton",
            derivation: Derivation::Tags,
            expected_address: "AyHFGMQUk4mqDHGrwG4385UyCKWNAFYotZX9oGgZQ1bc",
            expected_bump: 255,
        },
        GoldenVector {
            name: "profile of identity 0x01..",
            derivation: Derivation::Profile([0x01; 32]),
            expected_address: "Ch1DwXE3DfMmk2GNTTRrAfSVQmSDd4DZjoudd7A2bSSD",
            expected_bump: 254,
        },
        GoldenVector {
            name: "group profile of identity 0x01..",
            derivation: Derivation::Group([0x01; 32]),
            expected_address: "2yxLZocSY3rpaTiiN9YCEGrjML2KmoHjJyRTDSWQQSBG",
            expected_bump: 254,
        },
        GoldenVector {
            name: "post of identity 0x07..",
            derivation: Derivation::Post([0x07; 32]),
            expected_address: POST_OF_SEVENS,
            expected_bump: 254,
        },
        GoldenVector {
            name: "likes of post 0x07..",
            derivation: Derivation::Likes(POST_OF_SEVENS),
            expected_address: "9WgGfSn2BLKNZ2kB6rZ4uXprBKuELxmSXFLVAKk96qH3",
            expected_bump: 254,
        },
        GoldenVector {
            name: "thread root of post 0x07..",
            derivation: Derivation::Thread(POST_OF_SEVENS),
            expected_address: "74E9XZXD7JWTnh5HsrsD721jZAi4vnjQy6TFwTyWKhhp",
            expected_bump: 254,
        },
        // Eleven on-curve candidates before the first usable bump.
        GoldenVector {
            name: "reply of identity 0x08..",
            derivation: Derivation::Reply([0x08; 32]),
            expected_address: "2J3Bip9wyBrBUP8rVoNjL35VwuRhX5XuoCUUweNxnWVu",
            expected_bump: 244,
        },
    ]
}

/// Run a vector's derivation.
pub fn derive_vector(vector: &GoldenVector) -> Result<(Address, u8), CoreError> {
    let program = DEFAULT_PROGRAM_ID;
    match vector.derivation {
        Derivation::Registry => registry_address(&program),
        Derivation::Treasury => treasury_address(&program),
        Derivation::Tags => tags_address(&program),
        Derivation::Profile(owner) => profile_address(&program, &Identity::from_bytes(owner)),
        Derivation::Group(owner) => group_address(&program, &Identity::from_bytes(owner)),
        Derivation::Post(id) => post_address(&program, &PostIdentity::from_bytes(id)),
        Derivation::Reply(id) => reply_address(&program, &PostIdentity::from_bytes(id)),
        Derivation::Likes(post) => likes_address(&program, &Address::from_base58(post)?),
        Derivation::Thread(post) => {
            thread_address(&DEFAULT_THREAD_PROGRAM_ID, &Address::from_base58(post)?)
        }
    }
}

/// Check every vector. Returns `(name, matches, derived address)`.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match derive_vector(v) {
            Ok((address, bump)) => {
                let got = address.to_base58();
                let matches = got == v.expected_address && bump == v.expected_bump;
                (v.name.to_string(), matches, got)
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}

/// The vectors as JSON, for clients in other languages.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
