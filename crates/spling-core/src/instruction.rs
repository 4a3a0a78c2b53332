//! Instructions and their signed envelope.

use std::fmt;

use crate::canonical::signed_message;
use crate::crypto::{Blake3Hash, Identity, Keypair, Signature};
use crate::error::CoreError;
use crate::types::{Address, PostIdentity};

/// A tag attached to a post at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRef {
    /// An existing position in the tag registry.
    Index(u16),
    /// A tag name; registered if not already present.
    Name(String),
}

/// Every state transition the ledger accepts.
///
/// The signer is carried by [`SignedInstruction`], never by the instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    SetupSpling,
    CreateBank,
    CreateUserProfile {
        payout: Identity,
        alias: Option<String>,
    },
    SetupTags,
    SubmitPost {
        tag_index: u32,
        post_identity: PostIdentity,
        content: String,
        explicit_tag: Option<TagRef>,
    },
    IncrementLike {
        post: Address,
    },
    LikePost {
        post: Address,
    },
    CreateGroupProfile {
        payout: Identity,
    },
    SubmitReply {
        reply_identity: PostIdentity,
        post: Address,
        content: String,
    },
    FollowUser {
        uid: u64,
    },
    JoinGroup {
        gid: u64,
    },
}

impl Instruction {
    /// Stable opcode used in the canonical encoding.
    pub fn opcode(&self) -> u8 {
        match self {
            Self::SetupSpling => 0,
            Self::CreateBank => 1,
            Self::CreateUserProfile { .. } => 2,
            Self::SetupTags => 3,
            Self::SubmitPost { .. } => 4,
            Self::IncrementLike { .. } => 5,
            Self::LikePost { .. } => 6,
            Self::CreateGroupProfile { .. } => 7,
            Self::SubmitReply { .. } => 8,
            Self::FollowUser { .. } => 9,
            Self::JoinGroup { .. } => 10,
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetupSpling => "setup_spling",
            Self::CreateBank => "create_bank",
            Self::CreateUserProfile { .. } => "create_user_profile",
            Self::SetupTags => "setup_tags",
            Self::SubmitPost { .. } => "submit_post",
            Self::IncrementLike { .. } => "increment_like",
            Self::LikePost { .. } => "like_post",
            Self::CreateGroupProfile { .. } => "create_group_profile",
            Self::SubmitReply { .. } => "submit_reply",
            Self::FollowUser { .. } => "follow_user",
            Self::JoinGroup { .. } => "join_group",
        }
    }
}

/// Unique identifier for a signed instruction.
///
/// Computed as `blake3(signed_message || signature)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionId(pub [u8; 32]);

impl InstructionId {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstructionId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

/// An instruction together with its signer and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInstruction {
    pub signer: Identity,
    pub instruction: Instruction,
    pub signature: Signature,
}

impl SignedInstruction {
    /// Sign an instruction.
    pub fn sign(keypair: &Keypair, instruction: Instruction) -> Result<Self, CoreError> {
        let signer = keypair.identity();
        let message = signed_message(&signer, &instruction)?;
        let signature = keypair.sign(&message);
        Ok(Self {
            signer,
            instruction,
            signature,
        })
    }

    /// Wrap an instruction without a real signature.
    ///
    /// Only useful against a ledger that skips signature checks.
    pub fn unsigned(signer: Identity, instruction: Instruction) -> Self {
        Self {
            signer,
            instruction,
            signature: Signature::ZERO,
        }
    }

    /// Check the signature against the signer.
    pub fn verify(&self) -> Result<(), CoreError> {
        let message = signed_message(&self.signer, &self.instruction)?;
        self.signer.verify(&message, &self.signature)
    }

    /// Compute the instruction id.
    pub fn id(&self) -> Result<InstructionId, CoreError> {
        let mut buf = signed_message(&self.signer, &self.instruction)?;
        buf.extend_from_slice(self.signature.as_bytes());
        Ok(InstructionId(Blake3Hash::hash(&buf).0))
    }
}
