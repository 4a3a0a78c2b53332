//! Posts, likes and replies.

use spling_core::address::{
    like_address, likes_address, post_address, reply_address, thread_address,
};
use spling_core::{
    normalize_tag, validate_content, Address, Identity, Like, Likes, Post, PostIdentity, Profile,
    Registry, Reply, TagRef, TagRegistry, STATUS_ACTIVE,
};
use spling_store::{CommitResult, Store, WriteBatch};

use crate::bridge::{BridgeError, ThreadBridge};
use crate::error::{Dependency, LedgerError, Result};
use crate::ledger::{Ledger, PostReceipt, ReplyReceipt};

/// How a post's explicit tag resolves against the current tag set.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolvedTag {
    None,
    Existing(u16),
    /// Appended at this position.
    New(u16, String),
}

impl ResolvedTag {
    fn index(&self) -> Option<u16> {
        match self {
            Self::None => None,
            Self::Existing(i) | Self::New(i, _) => Some(*i),
        }
    }
}

impl<S: Store, B: ThreadBridge> Ledger<S, B> {
    /// Publish a post.
    ///
    /// Creates the post, its like counter and its thread root. The thread
    /// root is requested once local preconditions pass; if the thread
    /// protocol fails or answers with the wrong address, nothing is stored.
    /// The thread protocol hands back the same root when asked twice for
    /// one post, so a post whose commit failed can be resubmitted under
    /// the same identity.
    ///
    /// `tag_index` is the author's channel discriminator and is stored as
    /// given. `explicit_tag` attaches a tag from the tag registry, adding
    /// it first when named and not yet known.
    pub async fn submit_post(
        &self,
        caller: &Identity,
        tag_index: u32,
        post_identity: &PostIdentity,
        content: &str,
        explicit_tag: Option<&TagRef>,
    ) -> Result<PostReceipt> {
        let program = self.config.program_id;
        let registry_address = self.singletons.registry.0;
        let tags_address = self.singletons.tags.0;

        self.require_setup().await?;
        let (profile_address, _) = spling_core::address::profile_address(&program, caller)?;
        let (_, profile) = self
            .require::<Profile>(&profile_address, Dependency::Profile)
            .await?;
        let (_, tags) = self
            .require::<TagRegistry>(&tags_address, Dependency::TagRegistry)
            .await?;

        validate_content(content, &self.limits)?;

        let (post, post_bump) = post_address(&program, post_identity)?;
        if self.store.has_account(&post).await? {
            return Err(LedgerError::DuplicatePost(post));
        }
        let (likes, likes_bump) = likes_address(&program, &post)?;
        let (expected_thread, _) = thread_address(&self.config.thread_program_id, &post)?;

        // Reject bad tags before anything external happens.
        self.resolve_tag(&tags, explicit_tag)?;

        let thread = self.materialize_thread(&post, expected_thread).await?;

        let _writer = self.store.write_gate().enter().await;
        for attempt in 1..=self.config.max_commit_attempts {
            let (registry_record, mut registry) = self
                .require::<Registry>(&registry_address, Dependency::Registry)
                .await?;
            let (tags_record, mut tags) = self
                .require::<TagRegistry>(&tags_address, Dependency::TagRegistry)
                .await?;

            let pid = registry
                .posts
                .checked_add(1)
                .ok_or(LedgerError::CounterOverflow(registry_address))?;
            registry.posts = pid;

            let resolved = self.resolve_tag(&tags, explicit_tag)?;
            let mut batch = WriteBatch::new();
            if let ResolvedTag::New(_, name) = &resolved {
                tags.tags.push(name.clone());
                registry.tags = registry
                    .tags
                    .checked_add(1)
                    .ok_or(LedgerError::CounterOverflow(registry_address))?;
                batch = batch.update(Self::updated(&tags_record, &tags)?);
            }

            let body = Post {
                author: *caller,
                pid,
                uid: profile.uid,
                tag_index,
                tag: resolved.index(),
                payout: profile.payout,
                content: content.to_string(),
                likes,
                thread,
                status: STATUS_ACTIVE,
                created_at: self.clock.now_millis(),
            };
            batch = batch
                .create(self.new_record(post, post_bump, &body)?)
                .create(self.new_record(likes, likes_bump, &Likes::new(post))?)
                .update(Self::updated(&registry_record, &registry)?);

            match self.store.commit(&batch).await? {
                CommitResult::Committed => {
                    tracing::info!(%post, pid, %thread, tag = ?resolved.index(), "post submitted");
                    return Ok(PostReceipt {
                        post,
                        likes,
                        thread,
                        pid,
                        tag: resolved.index(),
                    });
                }
                CommitResult::Occupied(_) => return Err(LedgerError::DuplicatePost(post)),
                CommitResult::Stale(at) => {
                    tracing::debug!(attempt, %at, "counters moved, retrying post");
                }
            }
        }

        Err(self.contention(registry_address))
    }

    /// Add one to a post's like counter.
    pub async fn increment_like(&self, post: &Address) -> Result<u64> {
        let likes_address = self.likes_of(post).await?;

        let _writer = self.store.write_gate().enter().await;
        for attempt in 1..=self.config.max_commit_attempts {
            let (record, mut likes) = self.load_likes(post, &likes_address).await?;
            likes.count = likes
                .count
                .checked_add(1)
                .ok_or(LedgerError::CounterOverflow(likes_address))?;

            let batch = WriteBatch::new().update(Self::updated(&record, &likes)?);
            match self.store.commit(&batch).await? {
                CommitResult::Committed => {
                    tracing::info!(%post, count = likes.count, "like counted");
                    return Ok(likes.count);
                }
                CommitResult::Occupied(at) | CommitResult::Stale(at) => {
                    tracing::debug!(attempt, %at, "like counter moved, retrying");
                }
            }
        }

        Err(self.contention(likes_address))
    }

    /// Like a post as the caller's profile. Each profile likes a post at most once.
    ///
    /// The like is its own record next to the counter, created in the same
    /// batch that moves the counter.
    pub async fn like_post(&self, caller: &Identity, post: &Address) -> Result<u64> {
        let program = self.config.program_id;
        let (profile_address, _) = spling_core::address::profile_address(&program, caller)?;
        let (_, profile) = self
            .require::<Profile>(&profile_address, Dependency::Profile)
            .await?;
        let likes_address = self.likes_of(post).await?;
        let (like, like_bump) = like_address(&program, post, profile.uid)?;
        let already = || LedgerError::AlreadyLiked {
            post: *post,
            uid: profile.uid,
        };

        let _writer = self.store.write_gate().enter().await;
        if self.store.has_account(&like).await? {
            return Err(already());
        }

        let marker = Like {
            post: *post,
            uid: profile.uid,
            created_at: self.clock.now_millis(),
        };
        for attempt in 1..=self.config.max_commit_attempts {
            let (record, mut likes) = self.load_likes(post, &likes_address).await?;
            likes.count = likes
                .count
                .checked_add(1)
                .ok_or(LedgerError::CounterOverflow(likes_address))?;

            let batch = WriteBatch::new()
                .create(self.new_record(like, like_bump, &marker)?)
                .update(Self::updated(&record, &likes)?);
            match self.store.commit(&batch).await? {
                CommitResult::Committed => {
                    tracing::info!(%post, uid = profile.uid, count = likes.count, "post liked");
                    return Ok(likes.count);
                }
                CommitResult::Occupied(_) => return Err(already()),
                CommitResult::Stale(at) => {
                    tracing::debug!(attempt, %at, "like counter moved, retrying");
                }
            }
        }

        Err(self.contention(likes_address))
    }

    /// Reply to an existing post.
    pub async fn submit_reply(
        &self,
        caller: &Identity,
        reply_identity: &PostIdentity,
        post: &Address,
        content: &str,
    ) -> Result<ReplyReceipt> {
        let program = self.config.program_id;

        self.require_setup().await?;
        let (profile_address, _) = spling_core::address::profile_address(&program, caller)?;
        let (_, profile) = self
            .require::<Profile>(&profile_address, Dependency::Profile)
            .await?;

        validate_content(content, &self.limits)?;

        let (_, parent) = self
            .load::<Post>(post)
            .await?
            .ok_or(LedgerError::PostNotFound(*post))?;

        let (address, bump) = reply_address(&program, reply_identity)?;
        let reply = Reply {
            author: *caller,
            uid: profile.uid,
            post: *post,
            pid: parent.pid,
            content: content.to_string(),
            status: STATUS_ACTIVE,
            created_at: self.clock.now_millis(),
        };

        let batch = WriteBatch::new().create(self.new_record(address, bump, &reply)?);
        match self.store.commit(&batch).await? {
            CommitResult::Committed => {
                tracing::info!(%address, %post, pid = parent.pid, "reply submitted");
                Ok(ReplyReceipt {
                    address,
                    post: *post,
                    pid: parent.pid,
                })
            }
            CommitResult::Occupied(_) => Err(LedgerError::DuplicateReply(address)),
            CommitResult::Stale(at) => Err(self.contention(at)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask the thread protocol for a root and check where it landed.
    async fn materialize_thread(&self, post: &Address, expected: Address) -> Result<Address> {
        let thread = match self.bridge.materialize_thread_root(post).await {
            Ok(thread) => thread,
            Err(e) => {
                tracing::warn!(%post, error = %e, "thread protocol failed");
                return Err(LedgerError::ExternalCallFailed(e));
            }
        };

        if thread != expected {
            tracing::warn!(%post, %thread, %expected, "thread root at unexpected address");
            return Err(LedgerError::ExternalCallFailed(
                BridgeError::AddressMismatch {
                    expected,
                    got: thread,
                },
            ));
        }

        Ok(thread)
    }

    fn resolve_tag(&self, tags: &TagRegistry, explicit: Option<&TagRef>) -> Result<ResolvedTag> {
        match explicit {
            None => Ok(ResolvedTag::None),
            Some(TagRef::Index(index)) => match tags.get(*index) {
                Some(_) => Ok(ResolvedTag::Existing(*index)),
                None => Err(LedgerError::UnknownTag(format!("#{}", index))),
            },
            Some(TagRef::Name(name)) => {
                let name = normalize_tag(name, &self.limits)?;
                if let Some(index) = tags.position(&name) {
                    return Ok(ResolvedTag::Existing(index));
                }
                if tags.len() >= self.limits.max_tags {
                    return Err(LedgerError::TagRegistryFull(tags.len()));
                }
                let index =
                    u16::try_from(tags.len()).map_err(|_| LedgerError::TagRegistryFull(tags.len()))?;
                Ok(ResolvedTag::New(index, name))
            }
        }
    }

    /// Address of a post's like counter, checking the post exists.
    async fn likes_of(&self, post: &Address) -> Result<Address> {
        let (_, body) = self
            .load::<Post>(post)
            .await?
            .ok_or(LedgerError::PostNotFound(*post))?;
        Ok(body.likes)
    }

    async fn load_likes(
        &self,
        post: &Address,
        likes_address: &Address,
    ) -> Result<(spling_store::AccountRecord, Likes)> {
        self.load::<Likes>(likes_address)
            .await?
            .ok_or_else(|| LedgerError::AccountMismatch {
                address: *post,
                reason: "post has no like counter".into(),
            })
    }
}
