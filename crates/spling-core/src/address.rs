//! Deterministic address derivation.
//!
//! An address is `SHA-256(seeds… || bump || program_id || "ProgramDerivedAddress")`
//! for the highest bump in `255..=1` whose hash is *not* an Ed25519 curve
//! point. This is the scheme existing clients already use, so addresses
//! computed here match theirs byte for byte.
//!
//! The seed literals in [`seeds`] are part of the wire contract. Changing
//! one moves every record of that kind.

use sha2::{Digest, Sha256};

use crate::crypto::{is_on_curve, Identity};
use crate::error::CoreError;
use crate::types::{Address, PostIdentity, ProgramId};

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Fixed seed literals.
pub mod seeds {
    pub const SPLING: &[u8] = b"spling";
    pub const BANK: &[u8] = b"b";
    pub const USER_PROFILE: &[u8] = b"user_profile";
    pub const GROUP_PROFILE: &[u8] = b"group_profile";
    pub const TAGS: &[u8] = b"tags";
    pub const POST: &[u8] = b"post";
    pub const LIKES: &[u8] = b"likes";
    pub const REPLY: &[u8] = b"reply";
    pub const THREAD: &[u8] = b"thread";
    pub const POST_THREAD: &[u8] = b"post_thread";
    pub const LIKE: &[u8] = b"like";
    pub const FOLLOW: &[u8] = b"follow";
    pub const MEMBER: &[u8] = b"member";
}

/// Compute the address for seeds that already include their bump.
///
/// Fails with [`CoreError::OnCurve`] if the candidate is a valid public key.
pub fn create_program_address(seeds: &[&[u8]], program: &ProgramId) -> Result<Address, CoreError> {
    check_seeds(seeds, MAX_SEEDS)?;

    let candidate = hash_candidate(seeds, None, program);
    if is_on_curve(&candidate) {
        return Err(CoreError::OnCurve);
    }
    Ok(Address(candidate))
}

/// Find the canonical `(address, bump)` for seeds under a program.
pub fn find_program_address(
    seeds: &[&[u8]],
    program: &ProgramId,
) -> Result<(Address, u8), CoreError> {
    search(seeds, program, |candidate| !is_on_curve(candidate))
}

/// Bump search with a pluggable acceptance test.
pub(crate) fn search<F>(
    seeds: &[&[u8]],
    program: &ProgramId,
    accept: F,
) -> Result<(Address, u8), CoreError>
where
    F: Fn(&[u8; 32]) -> bool,
{
    // the bump occupies one seed slot
    check_seeds(seeds, MAX_SEEDS - 1)?;

    for bump in (1..=u8::MAX).rev() {
        let candidate = hash_candidate(seeds, Some(bump), program);
        if accept(&candidate) {
            return Ok((Address(candidate), bump));
        }
    }

    Err(CoreError::AddressExhausted)
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), CoreError> {
    if seeds.len() > max_seeds {
        return Err(CoreError::InvalidSeeds(format!(
            "{} seeds exceeds maximum of {}",
            seeds.len(),
            max_seeds
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(CoreError::InvalidSeeds(format!(
            "seed of {} bytes exceeds maximum of {}",
            seed.len(),
            MAX_SEED_LEN
        )));
    }
    Ok(())
}

fn hash_candidate(seeds: &[&[u8]], bump: Option<u8>, program: &ProgramId) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program.as_bytes());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed helpers, one per record kind
// ─────────────────────────────────────────────────────────────────────────────

/// Registry singleton: `["spling"]`.
pub fn registry_address(program: &ProgramId) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::SPLING], program)
}

/// Treasury singleton: `["b"]`.
pub fn treasury_address(program: &ProgramId) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::BANK], program)
}

/// Tag registry singleton: `["tags"]`.
pub fn tags_address(program: &ProgramId) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::TAGS], program)
}

/// One profile per participant: `["user_profile", identity]`.
pub fn profile_address(
    program: &ProgramId,
    owner: &Identity,
) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::USER_PROFILE, owner.as_ref()], program)
}

/// One group profile per participant: `["group_profile", identity]`.
pub fn group_address(program: &ProgramId, owner: &Identity) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::GROUP_PROFILE, owner.as_ref()], program)
}

/// Post named by a fresh identity: `["post", post_identity]`.
pub fn post_address(
    program: &ProgramId,
    post_identity: &PostIdentity,
) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::POST, post_identity.as_ref()], program)
}

/// The like counter owned by a post: `["likes", post]`.
pub fn likes_address(program: &ProgramId, post: &Address) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::LIKES, post.as_ref()], program)
}

/// One profile's like of a post: `["like", post, uid_le]`.
pub fn like_address(program: &ProgramId, post: &Address, uid: u64) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::LIKE, post.as_ref(), &uid.to_le_bytes()], program)
}

/// A follow relation: `["follow", follower, target_uid_le]`.
pub fn follow_address(
    program: &ProgramId,
    follower: &Identity,
    target_uid: u64,
) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::FOLLOW, follower.as_ref(), &target_uid.to_le_bytes()], program)
}

/// A group membership: `["member", member, gid_le]`.
pub fn membership_address(
    program: &ProgramId,
    member: &Identity,
    gid: u64,
) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::MEMBER, member.as_ref(), &gid.to_le_bytes()], program)
}

/// Reply named by a fresh identity: `["reply", reply_identity]`.
pub fn reply_address(
    program: &ProgramId,
    reply_identity: &PostIdentity,
) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::REPLY, reply_identity.as_ref()], program)
}

/// Thread root for a post, derived under the *external* thread program:
/// `["thread", post, "post_thread"]`.
pub fn thread_address(
    thread_program: &ProgramId,
    post: &Address,
) -> Result<(Address, u8), CoreError> {
    find_program_address(&[seeds::THREAD, post.as_ref(), seeds::POST_THREAD], thread_program)
}
