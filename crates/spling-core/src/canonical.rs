//! Canonical CBOR encoding for deterministic signing.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats
//!
//! Signatures cover these bytes, so the same instruction must encode to the
//! same bytes on every client.

use ciborium::value::Value;

use crate::crypto::Identity;
use crate::error::CoreError;
use crate::instruction::{Instruction, TagRef};

/// Domain separator prepended to every signed instruction.
pub const SIGNING_DOMAIN: &[u8] = b"spling-ix-v0:";

/// Instruction field keys.
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const OPCODE: u64 = 0;
    pub const SIGNER: u64 = 1;
    pub const ARG0: u64 = 2;
    pub const ARG1: u64 = 3;
    pub const ARG2: u64 = 4;
    pub const ARG3: u64 = 5;
}

/// Encode an instruction and its signer to canonical CBOR bytes.
pub fn canonical_instruction_bytes(
    signer: &Identity,
    instruction: &Instruction,
) -> Result<Vec<u8>, CoreError> {
    let value = instruction_to_cbor_value(signer, instruction);
    encode_cbor_value_canonical(&value)
}

/// Construct the signed message: `SIGNING_DOMAIN || canonical bytes`.
pub fn signed_message(signer: &Identity, instruction: &Instruction) -> Result<Vec<u8>, CoreError> {
    let body = canonical_instruction_bytes(signer, instruction)?;
    let mut buf = Vec::with_capacity(SIGNING_DOMAIN.len() + body.len());
    buf.extend_from_slice(SIGNING_DOMAIN);
    buf.extend_from_slice(&body);
    Ok(buf)
}

fn key(k: u64) -> Value {
    Value::Integer(k.into())
}

fn bytes(b: &[u8]) -> Value {
    Value::Bytes(b.to_vec())
}

fn optional_text(s: &Option<String>) -> Value {
    match s {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

fn tag_ref_value(tag: &Option<TagRef>) -> Value {
    match tag {
        Some(TagRef::Index(i)) => Value::Array(vec![key(0), Value::Integer((*i).into())]),
        Some(TagRef::Name(name)) => Value::Array(vec![key(1), Value::Text(name.clone())]),
        None => Value::Null,
    }
}

/// Convert an instruction to a CBOR map with integer keys.
fn instruction_to_cbor_value(signer: &Identity, instruction: &Instruction) -> Value {
    let mut entries = vec![
        (key(keys::OPCODE), Value::Integer(instruction.opcode().into())),
        (key(keys::SIGNER), bytes(signer.as_bytes())),
    ];

    match instruction {
        Instruction::SetupSpling | Instruction::CreateBank | Instruction::SetupTags => {}
        Instruction::CreateUserProfile { payout, alias } => {
            entries.push((key(keys::ARG0), bytes(payout.as_bytes())));
            entries.push((key(keys::ARG1), optional_text(alias)));
        }
        Instruction::SubmitPost {
            tag_index,
            post_identity,
            content,
            explicit_tag,
        } => {
            entries.push((key(keys::ARG0), Value::Integer((*tag_index).into())));
            entries.push((key(keys::ARG1), bytes(post_identity.as_bytes())));
            entries.push((key(keys::ARG2), Value::Text(content.clone())));
            entries.push((key(keys::ARG3), tag_ref_value(explicit_tag)));
        }
        Instruction::IncrementLike { post } | Instruction::LikePost { post } => {
            entries.push((key(keys::ARG0), bytes(post.as_bytes())));
        }
        Instruction::CreateGroupProfile { payout } => {
            entries.push((key(keys::ARG0), bytes(payout.as_bytes())));
        }
        Instruction::SubmitReply {
            reply_identity,
            post,
            content,
        } => {
            entries.push((key(keys::ARG0), bytes(reply_identity.as_bytes())));
            entries.push((key(keys::ARG1), bytes(post.as_bytes())));
            entries.push((key(keys::ARG2), Value::Text(content.clone())));
        }
        Instruction::FollowUser { uid } => {
            entries.push((key(keys::ARG0), Value::Integer((*uid).into())));
        }
        Instruction::JoinGroup { gid } => {
            entries.push((key(keys::ARG0), Value::Integer((*gid).into())));
        }
    }

    Value::Map(entries)
}

/// Encode a CBOR Value to canonical bytes.
fn encode_cbor_value_canonical(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CoreError> {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => encode_bytes(buf, b),
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => encode_array(buf, arr)?,
        Value::Map(entries) => encode_map_canonical(buf, entries)?,
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => {
            return Err(CoreError::EncodingError(
                "floats not supported in canonical encoding".into(),
            ))
        }
        _ => {
            return Err(CoreError::EncodingError(
                "unsupported CBOR value type".into(),
            ))
        }
    }
    Ok(())
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        let abs = (-1 - n) as u64;
        encode_uint(buf, 1, abs);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<(), CoreError> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CoreError> {
    let mut key_value_pairs = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        key_value_pairs.push((key_buf, v));
    }

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}
