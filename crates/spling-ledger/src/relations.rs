//! Follows and group memberships.
//!
//! Both are append-only records at addresses derived from the participant
//! and the target id, so a second follow or join collides instead of
//! growing the profile.

use spling_core::address::{follow_address, membership_address, profile_address};
use spling_core::{Follow, Identity, Membership, Profile, Registry};
use spling_store::{CommitResult, Store, WriteBatch};

use crate::bridge::ThreadBridge;
use crate::error::{Dependency, LedgerError, Result};
use crate::ledger::{FollowReceipt, Ledger, MembershipReceipt};

impl<S: Store, B: ThreadBridge> Ledger<S, B> {
    /// Follow the profile numbered `uid`.
    pub async fn follow_user(&self, caller: &Identity, uid: u64) -> Result<FollowReceipt> {
        let (registry, profile) = self.participant(caller).await?;
        if uid == 0 || uid > registry.users {
            return Err(LedgerError::UserNotFound(uid));
        }

        let (address, bump) = follow_address(&self.config.program_id, caller, uid)?;
        let follow = Follow {
            follower: *caller,
            follower_uid: profile.uid,
            target_uid: uid,
            created_at: self.clock.now_millis(),
        };

        let batch = WriteBatch::new().create(self.new_record(address, bump, &follow)?);
        match self.store.commit(&batch).await? {
            CommitResult::Committed => {
                tracing::info!(%address, follower = profile.uid, target = uid, "user followed");
                Ok(FollowReceipt {
                    address,
                    follower_uid: profile.uid,
                    target_uid: uid,
                })
            }
            CommitResult::Occupied(_) => Err(LedgerError::DuplicateFollow { uid }),
            CommitResult::Stale(at) => Err(self.contention(at)),
        }
    }

    /// Join the group numbered `gid`.
    pub async fn join_group(&self, caller: &Identity, gid: u64) -> Result<MembershipReceipt> {
        let (registry, profile) = self.participant(caller).await?;
        if gid == 0 || gid > registry.groups {
            return Err(LedgerError::GroupNotFound(gid));
        }

        let (address, bump) = membership_address(&self.config.program_id, caller, gid)?;
        let membership = Membership {
            member: *caller,
            uid: profile.uid,
            gid,
            created_at: self.clock.now_millis(),
        };

        let batch = WriteBatch::new().create(self.new_record(address, bump, &membership)?);
        match self.store.commit(&batch).await? {
            CommitResult::Committed => {
                tracing::info!(%address, uid = profile.uid, gid, "group joined");
                Ok(MembershipReceipt {
                    address,
                    uid: profile.uid,
                    gid,
                })
            }
            CommitResult::Occupied(_) => Err(LedgerError::AlreadyMember { gid }),
            CommitResult::Stale(at) => Err(self.contention(at)),
        }
    }

    /// The Registry and the caller's profile, after the setup checks.
    async fn participant(&self, caller: &Identity) -> Result<(Registry, Profile)> {
        self.require_setup().await?;
        let (address, _) = profile_address(&self.config.program_id, caller)?;
        let (_, profile) = self
            .require::<Profile>(&address, Dependency::Profile)
            .await?;
        let (_, registry) = self
            .require::<Registry>(&self.singletons.registry.0, Dependency::Registry)
            .await?;
        Ok((registry, profile))
    }
}
