//! Record layouts.
//!
//! Every record lives at a derived address and is one of the kinds in
//! [`AccountKind`]. Bodies are CBOR-encoded with `ciborium`; the store keeps
//! the kind next to the bytes so a body is never decoded as the wrong type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::error::CoreError;
use crate::types::Address;

/// Status value written into every newly created record.
pub const STATUS_ACTIVE: u8 = 1;

/// Kind discriminator for stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum AccountKind {
    // Singletons (0x0000 - 0x00FF)
    /// Global counters.
    Registry = 0x0001,
    /// Treasury placeholder.
    Treasury = 0x0002,
    /// Ordered tag list.
    TagRegistry = 0x0003,

    // Per-participant records (0x0100 - 0x01FF)
    /// One per identity.
    Profile = 0x0100,
    /// One group profile per identity.
    GroupProfile = 0x0101,
    /// One participant following another.
    Follow = 0x0102,
    /// One participant's membership in a group.
    Membership = 0x0103,

    // Content (0x0200 - 0x02FF)
    /// A published post.
    Post = 0x0200,
    /// The like counter owned by a post.
    Likes = 0x0201,
    /// A reply to a post.
    Reply = 0x0202,
    /// One profile's like of one post.
    Like = 0x0203,
}

impl AccountKind {
    /// Convert to u16 for storage.
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Try to parse from u16.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0001 => Some(Self::Registry),
            0x0002 => Some(Self::Treasury),
            0x0003 => Some(Self::TagRegistry),
            0x0100 => Some(Self::Profile),
            0x0101 => Some(Self::GroupProfile),
            0x0102 => Some(Self::Follow),
            0x0103 => Some(Self::Membership),
            0x0200 => Some(Self::Post),
            0x0201 => Some(Self::Likes),
            0x0202 => Some(Self::Reply),
            0x0203 => Some(Self::Like),
            _ => None,
        }
    }

    /// Singletons exist at most once per program.
    pub fn is_singleton(self) -> bool {
        (self.to_u16() & 0xFF00) == 0x0000
    }

    /// Whether records of this kind may be updated after creation.
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Registry | Self::TagRegistry | Self::Likes)
    }
}

/// A typed record body.
pub trait Account: Serialize + DeserializeOwned {
    /// The discriminator stored alongside the body.
    const KIND: AccountKind;

    /// Encode the body to CBOR.
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Decode a body from CBOR.
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

/// Global counters, created once by `setup_spling`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub authority: Identity,
    pub users: u64,
    pub groups: u64,
    pub posts: u64,
    pub tags: u64,
}

impl Registry {
    pub fn new(authority: Identity) -> Self {
        Self {
            authority,
            users: 0,
            groups: 0,
            posts: 0,
            tags: 0,
        }
    }
}

impl Account for Registry {
    const KIND: AccountKind = AccountKind::Registry;
}

/// Treasury placeholder. No funds ever move through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    pub authority: Identity,
    pub balance: u64,
}

impl Account for Treasury {
    const KIND: AccountKind = AccountKind::Treasury;
}

/// A participant's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub owner: Identity,
    pub uid: u64,
    /// Where tips would be paid, if payments were enabled.
    pub payout: Identity,
    pub alias: Option<String>,
    pub status: u8,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl Account for Profile {
    const KIND: AccountKind = AccountKind::Profile;
}

/// A participant's group profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProfile {
    pub owner: Identity,
    pub gid: u64,
    pub payout: Identity,
    pub status: u8,
    pub created_at: i64,
}

impl Account for GroupProfile {
    const KIND: AccountKind = AccountKind::GroupProfile;
}

/// The ordered set of known tags. A tag's index is its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRegistry {
    pub tags: Vec<String>,
}

impl TagRegistry {
    /// Position of a normalized tag name.
    pub fn position(&self, name: &str) -> Option<u16> {
        self.tags
            .iter()
            .position(|t| t == name)
            .and_then(|i| u16::try_from(i).ok())
    }

    pub fn get(&self, index: u16) -> Option<&str> {
        self.tags.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Account for TagRegistry {
    const KIND: AccountKind = AccountKind::TagRegistry;
}

/// A published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub author: Identity,
    pub pid: u64,
    /// Author's uid at publication.
    pub uid: u64,
    /// Channel discriminator chosen by the author, stored verbatim.
    pub tag_index: u32,
    /// Resolved position in the tag registry, if a tag was attached.
    pub tag: Option<u16>,
    pub payout: Identity,
    pub content: String,
    pub likes: Address,
    pub thread: Address,
    pub status: u8,
    pub created_at: i64,
}

impl Account for Post {
    const KIND: AccountKind = AccountKind::Post;
}

/// Like counter for one post.
///
/// Who liked is not kept here; each profile like is its own [`Like`] record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Likes {
    pub post: Address,
    pub count: u64,
}

impl Likes {
    pub fn new(post: Address) -> Self {
        Self { post, count: 0 }
    }
}

impl Account for Likes {
    const KIND: AccountKind = AccountKind::Likes;
}

/// Marks that a profile liked a post. Its address is the uniqueness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub post: Address,
    pub uid: u64,
    pub created_at: i64,
}

impl Account for Like {
    const KIND: AccountKind = AccountKind::Like;
}

/// `follower` follows the profile numbered `target_uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub follower: Identity,
    pub follower_uid: u64,
    pub target_uid: u64,
    pub created_at: i64,
}

impl Account for Follow {
    const KIND: AccountKind = AccountKind::Follow;
}

/// `member` belongs to the group numbered `gid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub member: Identity,
    pub uid: u64,
    pub gid: u64,
    pub created_at: i64,
}

impl Account for Membership {
    const KIND: AccountKind = AccountKind::Membership;
}

/// A reply to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub author: Identity,
    pub uid: u64,
    pub post: Address,
    /// Parent post's pid.
    pub pid: u64,
    pub content: String,
    pub status: u8,
    pub created_at: i64,
}

impl Account for Reply {
    const KIND: AccountKind = AccountKind::Reply;
}
