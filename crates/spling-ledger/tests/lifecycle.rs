//! End-to-end lifecycle: setup, profiles, posts, tags, replies, groups.

use spling_core::address::{likes_address, post_address, thread_address};
use spling_core::{Identity, Keypair, PostIdentity, TagRef};
use spling_ledger::{
    Dependency, LedgerConfig, LedgerError, PostReceipt, DEFAULT_PROGRAM_ID,
    DEFAULT_THREAD_PROGRAM_ID,
};
use spling_testkit::{multi_party_keypairs, TestFixture, TestLedger};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn missing<T>(result: Result<T, LedgerError>) -> Option<Dependency> {
    match result {
        Err(LedgerError::DependencyMissing(d)) => Some(d),
        _ => None,
    }
}

async fn post_once(ledger: &TestLedger, me: &Identity) -> Result<PostReceipt, LedgerError> {
    ledger
        .submit_post(me, 1, &PostIdentity::generate(), "hi", None)
        .await
}

#[tokio::test]
async fn test_first_post_end_to_end() -> anyhow::Result<()> {
    init_tracing();
    let fixture = TestFixture::with_seed([0x42; 32]);
    let me = fixture.identity();

    fixture.ledger.setup_spling(&me).await?;
    fixture.ledger.create_bank(&me).await?;
    let profile = fixture.ledger.create_user_profile(&me, &me, None).await?;
    fixture.ledger.setup_tags(&me).await?;
    assert_eq!(profile.uid, 1);

    // The tag registry is empty, yet channel 1 is accepted: it is a
    // discriminator, not a registry position.
    assert!(fixture.ledger.tag_registry().await?.unwrap().is_empty());

    let identity = PostIdentity::from_bytes([0x07; 32]);
    let receipt = fixture
        .ledger
        .submit_post(&me, 1, &identity, "hello", None)
        .await?;

    let (expected_post, _) = post_address(&DEFAULT_PROGRAM_ID, &identity)?;
    let (expected_likes, _) = likes_address(&DEFAULT_PROGRAM_ID, &expected_post)?;
    let (expected_thread, _) = thread_address(&DEFAULT_THREAD_PROGRAM_ID, &expected_post)?;
    assert_eq!(receipt.post, expected_post);
    assert_eq!(receipt.likes, expected_likes);
    assert_eq!(receipt.thread, expected_thread);
    assert_eq!(receipt.pid, 1);
    assert_eq!(receipt.tag, None);

    let post = fixture.ledger.post(&receipt.post).await?.unwrap();
    assert_eq!(post.content, "hello");
    assert_eq!(post.tag_index, 1);
    assert_eq!(post.author, me);
    assert_eq!(post.uid, 1);
    assert_eq!(post.thread, expected_thread);

    let likes = fixture.ledger.likes(&receipt.post).await?.unwrap();
    assert_eq!(likes.count, 0);
    assert_eq!(likes.post, receipt.post);

    let root = fixture.threads.thread(&expected_thread).await.unwrap();
    assert_eq!(root.post, receipt.post);

    assert_eq!(fixture.ledger.registry().await?.unwrap().posts, 1);
    Ok(())
}

#[tokio::test]
async fn test_setup_is_idempotent() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();
    let before = fixture.ledger.state_hash().await.unwrap();

    assert!(matches!(
        fixture.ledger.setup_spling(&me).await,
        Err(LedgerError::AlreadyInitialized(_))
    ));
    assert!(matches!(
        fixture.ledger.create_bank(&me).await,
        Err(LedgerError::AlreadyInitialized(_))
    ));
    assert!(matches!(
        fixture.ledger.setup_tags(&me).await,
        Err(LedgerError::AlreadyInitialized(_))
    ));

    assert_eq!(fixture.ledger.state_hash().await.unwrap(), before);
}

#[tokio::test]
async fn test_dependencies_are_enforced_in_order() {
    let fixture = TestFixture::with_seed([0x11; 32]);
    let me = fixture.identity();
    let ledger = &fixture.ledger;

    assert_eq!(missing(ledger.create_bank(&me).await), Some(Dependency::Registry));
    assert_eq!(missing(ledger.setup_tags(&me).await), Some(Dependency::Registry));
    assert_eq!(
        missing(ledger.create_user_profile(&me, &me, None).await),
        Some(Dependency::Registry)
    );

    ledger.setup_spling(&me).await.unwrap();
    assert_eq!(
        missing(ledger.create_user_profile(&me, &me, None).await),
        Some(Dependency::Treasury)
    );
    assert_eq!(
        missing(ledger.create_group_profile(&me, &me).await),
        Some(Dependency::Treasury)
    );

    ledger.create_bank(&me).await.unwrap();
    assert_eq!(missing(post_once(ledger, &me).await), Some(Dependency::Profile));

    ledger.create_user_profile(&me, &me, None).await.unwrap();
    assert_eq!(missing(post_once(ledger, &me).await), Some(Dependency::TagRegistry));

    ledger.setup_tags(&me).await.unwrap();
    assert!(post_once(ledger, &me).await.is_ok());
}

#[tokio::test]
async fn test_profiles_are_unique_and_numbered() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();

    assert!(matches!(
        fixture.ledger.create_user_profile(&me, &me, Some("again")).await,
        Err(LedgerError::DuplicateProfile(_))
    ));

    let others = multi_party_keypairs(3);
    for (i, other) in others.iter().enumerate() {
        let receipt = fixture.join(other).await.unwrap();
        assert_eq!(receipt.uid, i as u64 + 2);
    }
    assert_eq!(fixture.ledger.registry().await.unwrap().unwrap().users, 4);
}

#[tokio::test]
async fn test_profile_alias_is_normalized() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let [alice, bob, carol]: [Keypair; 3] = multi_party_keypairs(3).try_into().unwrap();

    let (a, b, c) = (alice.identity(), bob.identity(), carol.identity());
    fixture
        .ledger
        .create_user_profile(&a, &a, Some("  alice  "))
        .await
        .unwrap();
    fixture
        .ledger
        .create_user_profile(&b, &b, Some("   "))
        .await
        .unwrap();

    assert_eq!(
        fixture.ledger.profile(&a).await.unwrap().unwrap().alias.as_deref(),
        Some("alice")
    );
    assert_eq!(fixture.ledger.profile(&b).await.unwrap().unwrap().alias, None);

    let long = "x".repeat(33);
    assert!(matches!(
        fixture.ledger.create_user_profile(&c, &c, Some(&long)).await,
        Err(LedgerError::InvalidAlias(_))
    ));
    assert!(fixture.ledger.profile(&c).await.unwrap().is_none());
    assert_eq!(fixture.ledger.registry().await.unwrap().unwrap().users, 3);
}

#[tokio::test]
async fn test_payout_is_carried_onto_posts() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let author = Keypair::from_seed(&[0x21; 32]).identity();
    let payout = Keypair::from_seed(&[0x22; 32]).identity();

    fixture
        .ledger
        .create_user_profile(&author, &payout, None)
        .await
        .unwrap();
    let receipt = fixture
        .ledger
        .submit_post(&author, 3, &PostIdentity::generate(), "tip me", None)
        .await
        .unwrap();

    let post = fixture.ledger.post(&receipt.post).await.unwrap().unwrap();
    assert_eq!(post.payout, payout);
    assert_eq!(post.tag_index, 3);
}

#[tokio::test]
async fn test_post_content_limit() {
    let fixture = TestFixture::bootstrapped().await.unwrap();

    let exact = "a".repeat(512);
    assert!(fixture.post(&exact).await.is_ok());

    let over = "a".repeat(513);
    assert!(matches!(
        fixture.post(&over).await,
        Err(LedgerError::ContentTooLong { len: 513, max: 512 })
    ));
    assert_eq!(fixture.ledger.registry().await.unwrap().unwrap().posts, 1);
    assert_eq!(fixture.threads.thread_count().await, 1);
}

#[tokio::test]
async fn test_post_identity_cannot_be_reused() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();
    let identity = PostIdentity::generate();

    fixture
        .ledger
        .submit_post(&me, 1, &identity, "first", None)
        .await
        .unwrap();
    let before = fixture.ledger.state_hash().await.unwrap();

    assert!(matches!(
        fixture.ledger.submit_post(&me, 1, &identity, "second", None).await,
        Err(LedgerError::DuplicatePost(_))
    ));
    assert_eq!(fixture.ledger.state_hash().await.unwrap(), before);
    assert_eq!(fixture.threads.thread_count().await, 1);
}

#[tokio::test]
async fn test_posts_are_numbered_and_listed() {
    let fixture = TestFixture::bootstrapped().await.unwrap();

    let mut pids = Vec::new();
    for i in 0..5 {
        pids.push(fixture.post(&format!("post {}", i)).await.unwrap().pid);
    }
    assert_eq!(pids, vec![1, 2, 3, 4, 5]);

    let posts = fixture.ledger.posts().await.unwrap();
    assert_eq!(posts.len(), 5);
    let addresses: Vec<_> = posts.iter().map(|(a, _)| *a).collect();
    let mut sorted = addresses.clone();
    sorted.sort();
    assert_eq!(addresses, sorted);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tags
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_named_tags_are_registered_once() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();
    let ledger = &fixture.ledger;

    let first = ledger
        .submit_post(&me, 1, &PostIdentity::generate(), "a", Some(&TagRef::Name("Rust".into())))
        .await
        .unwrap();
    let second = ledger
        .submit_post(&me, 1, &PostIdentity::generate(), "b", Some(&TagRef::Name(" rust ".into())))
        .await
        .unwrap();
    let third = ledger
        .submit_post(&me, 1, &PostIdentity::generate(), "c", Some(&TagRef::Name("solana".into())))
        .await
        .unwrap();
    let fourth = ledger
        .submit_post(&me, 1, &PostIdentity::generate(), "d", Some(&TagRef::Index(1)))
        .await
        .unwrap();

    assert_eq!(first.tag, Some(0));
    assert_eq!(second.tag, Some(0));
    assert_eq!(third.tag, Some(1));
    assert_eq!(fourth.tag, Some(1));

    let tags = ledger.tag_registry().await.unwrap().unwrap();
    assert_eq!(tags.tags, vec!["rust".to_string(), "solana".to_string()]);
    assert_eq!(ledger.registry().await.unwrap().unwrap().tags, 2);

    let post = ledger.post(&fourth.post).await.unwrap().unwrap();
    assert_eq!(post.tag, Some(1));
}

#[tokio::test]
async fn test_bad_tags_change_nothing() {
    let config = LedgerConfig {
        max_tags: 1,
        ..Default::default()
    };
    let fixture = TestFixture::with_config([0x42; 32], config);
    fixture.bootstrap().await.unwrap();
    let me = fixture.identity();
    let ledger = &fixture.ledger;

    ledger
        .submit_post(&me, 1, &PostIdentity::generate(), "a", Some(&TagRef::Name("only".into())))
        .await
        .unwrap();
    let before = ledger.state_hash().await.unwrap();

    assert!(matches!(
        ledger
            .submit_post(&me, 1, &PostIdentity::generate(), "b", Some(&TagRef::Index(4)))
            .await,
        Err(LedgerError::UnknownTag(_))
    ));
    assert!(matches!(
        ledger
            .submit_post(&me, 1, &PostIdentity::generate(), "c", Some(&TagRef::Name("more".into())))
            .await,
        Err(LedgerError::TagRegistryFull(1))
    ));
    assert!(matches!(
        ledger
            .submit_post(&me, 1, &PostIdentity::generate(), "d", Some(&TagRef::Name("two words".into())))
            .await,
        Err(LedgerError::UnknownTag(_))
    ));

    assert_eq!(ledger.state_hash().await.unwrap(), before);
    assert_eq!(fixture.threads.thread_count().await, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Replies and groups
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_replies_point_at_their_post() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();
    fixture.post("first").await.unwrap();
    let parent = fixture.post("second").await.unwrap();

    let reply_identity = PostIdentity::generate();
    let receipt = fixture
        .ledger
        .submit_reply(&me, &reply_identity, &parent.post, "agreed")
        .await
        .unwrap();
    assert_eq!(receipt.post, parent.post);
    assert_eq!(receipt.pid, 2);

    let reply = fixture.ledger.reply(&receipt.address).await.unwrap().unwrap();
    assert_eq!(reply.content, "agreed");
    assert_eq!(reply.uid, 1);

    assert!(matches!(
        fixture
            .ledger
            .submit_reply(&me, &reply_identity, &parent.post, "again")
            .await,
        Err(LedgerError::DuplicateReply(_))
    ));

    let nowhere = spling_core::Address::from_bytes([0xee; 32]);
    assert!(matches!(
        fixture
            .ledger
            .submit_reply(&me, &PostIdentity::generate(), &nowhere, "hello?")
            .await,
        Err(LedgerError::PostNotFound(_))
    ));
}

#[tokio::test]
async fn test_group_profiles() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();

    let group = fixture.ledger.create_group_profile(&me, &me).await.unwrap();
    assert_eq!(group.gid, 1);
    assert!(matches!(
        fixture.ledger.create_group_profile(&me, &me).await,
        Err(LedgerError::DuplicateGroup(_))
    ));

    let stored = fixture.ledger.group_profile(&me).await.unwrap().unwrap();
    assert_eq!(stored.gid, 1);
    assert_eq!(stored.owner, me);

    let registry = fixture.ledger.registry().await.unwrap().unwrap();
    assert_eq!(registry.groups, 1);
    assert_eq!(registry.users, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Follows and memberships
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_follow_is_recorded_once() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();
    let [alice]: [Keypair; 1] = multi_party_keypairs(1).try_into().unwrap();
    let alice_uid = fixture.join(&alice).await.unwrap().uid;
    let profile_before = fixture.ledger.profile(&me).await.unwrap();

    let receipt = fixture.ledger.follow_user(&me, alice_uid).await.unwrap();
    assert_eq!((receipt.follower_uid, receipt.target_uid), (1, 2));

    let follow = fixture.ledger.follow(&me, alice_uid).await.unwrap().unwrap();
    assert_eq!(follow.follower, me);
    assert!(fixture.ledger.follow(&alice.identity(), 1).await.unwrap().is_none());

    let before = fixture.ledger.state_hash().await.unwrap();
    assert!(matches!(
        fixture.ledger.follow_user(&me, alice_uid).await,
        Err(LedgerError::DuplicateFollow { uid: 2 })
    ));
    assert_eq!(fixture.ledger.state_hash().await.unwrap(), before);

    // Following never touches the profile itself.
    assert_eq!(fixture.ledger.profile(&me).await.unwrap(), profile_before);
}

#[tokio::test]
async fn test_follow_requires_known_profiles() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();

    assert!(matches!(
        fixture.ledger.follow_user(&me, 2).await,
        Err(LedgerError::UserNotFound(2))
    ));
    assert!(matches!(
        fixture.ledger.follow_user(&me, 0).await,
        Err(LedgerError::UserNotFound(0))
    ));

    let stranger = Keypair::from_seed(&[0x77; 32]).identity();
    assert_eq!(
        missing(fixture.ledger.follow_user(&stranger, 1).await),
        Some(Dependency::Profile)
    );
}

#[tokio::test]
async fn test_group_membership() {
    let fixture = TestFixture::bootstrapped().await.unwrap();
    let me = fixture.identity();
    let [alice]: [Keypair; 1] = multi_party_keypairs(1).try_into().unwrap();
    let a = alice.identity();
    fixture.join(&alice).await.unwrap();

    assert!(matches!(
        fixture.ledger.join_group(&a, 1).await,
        Err(LedgerError::GroupNotFound(1))
    ));

    let group = fixture.ledger.create_group_profile(&me, &me).await.unwrap();
    let receipt = fixture.ledger.join_group(&a, group.gid).await.unwrap();
    assert_eq!((receipt.uid, receipt.gid), (2, 1));
    assert!(matches!(
        fixture.ledger.join_group(&a, group.gid).await,
        Err(LedgerError::AlreadyMember { gid: 1 })
    ));

    let membership = fixture.ledger.membership(&a, 1).await.unwrap().unwrap();
    assert_eq!(membership.member, a);
    assert!(fixture.ledger.membership(&me, 1).await.unwrap().is_none());
}
