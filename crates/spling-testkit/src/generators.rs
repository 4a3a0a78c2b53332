//! Proptest generators for property-based testing.

use proptest::prelude::*;

use spling_core::{
    Address, CoreError, Identity, Instruction, Keypair, PostIdentity, SignedInstruction, TagRef,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a participant identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    keypair().prop_map(|kp| kp.identity())
}

/// Generate a post or reply identity.
pub fn post_identity() -> impl Strategy<Value = PostIdentity> {
    any::<[u8; 32]>().prop_map(PostIdentity::from_bytes)
}

/// Generate an arbitrary address. Not necessarily one a derivation produces.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 32]>().prop_map(Address::from_bytes)
}

/// Generate post content of at most `max_len` characters.
pub fn content(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..=max_len).prop_map(|chars| chars.into_iter().collect())
}

/// Generate an alias that passes normalization unchanged.
pub fn alias() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_.]{0,15}".prop_map(String::from)
}

/// Generate a tag name already in normalized form.
pub fn tag_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}".prop_map(String::from)
}

/// Generate a tag reference, by index or by name.
pub fn tag_ref() -> impl Strategy<Value = TagRef> {
    prop_oneof![
        any::<u16>().prop_map(TagRef::Index),
        tag_name().prop_map(TagRef::Name),
    ]
}

/// Parameters for generating a signed post submission.
#[derive(Debug, Clone)]
pub struct PostParams {
    pub keypair: Keypair,
    pub tag_index: u32,
    pub post_identity: PostIdentity,
    pub content: String,
    pub explicit_tag: Option<TagRef>,
}

impl Arbitrary for PostParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            any::<u32>(),
            post_identity(),
            content(200),
            prop::option::of(tag_ref()),
        )
            .prop_map(|(seed, tag_index, post_identity, content, explicit_tag)| PostParams {
                keypair: Keypair::from_seed(&seed),
                tag_index,
                post_identity,
                content,
                explicit_tag,
            })
            .boxed()
    }
}

/// Build and sign the post submission described by `params`.
pub fn instruction_from_params(params: &PostParams) -> Result<SignedInstruction, CoreError> {
    SignedInstruction::sign(
        &params.keypair,
        Instruction::SubmitPost {
            tag_index: params.tag_index,
            post_identity: params.post_identity,
            content: params.content.clone(),
            explicit_tag: params.explicit_tag.clone(),
        },
    )
}
