//! Instruction argument validation.

use crate::error::ValidationError;
use crate::instruction::SignedInstruction;

/// Size limits applied to user-supplied text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Post and reply bodies, in bytes.
    pub max_content_len: usize,
    /// Profile alias, in characters after trimming.
    pub max_alias_len: usize,
    /// Tag name, in characters after normalization.
    pub max_tag_len: usize,
    /// Entries in the tag registry.
    pub max_tags: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_content_len: 512,
            max_alias_len: 32,
            max_tag_len: 32,
            max_tags: 256,
        }
    }
}

/// Check a post or reply body against the content limit.
pub fn validate_content(content: &str, limits: &Limits) -> Result<(), ValidationError> {
    if content.len() > limits.max_content_len {
        return Err(ValidationError::ContentTooLong {
            len: content.len(),
            max: limits.max_content_len,
        });
    }
    Ok(())
}

/// Trim an alias. Blank aliases become `None`.
pub fn normalize_alias(
    alias: Option<&str>,
    limits: &Limits,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = alias.map(str::trim).filter(|a| !a.is_empty()) else {
        return Ok(None);
    };

    if trimmed.chars().count() > limits.max_alias_len {
        return Err(ValidationError::InvalidAlias(format!(
            "longer than {} characters",
            limits.max_alias_len
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidAlias(
            "contains control characters".into(),
        ));
    }

    Ok(Some(trimmed.to_string()))
}

/// Normalize a tag name: trimmed and lowercased.
pub fn normalize_tag(name: &str, limits: &Limits) -> Result<String, ValidationError> {
    let normalized = name.trim().to_lowercase();

    if normalized.is_empty()
        || normalized.chars().count() > limits.max_tag_len
        || normalized.chars().any(|c| c.is_control() || c.is_whitespace())
    {
        return Err(ValidationError::InvalidTagName(name.to_string()));
    }

    Ok(normalized)
}

/// Verify a signed instruction's signature.
pub fn validate_signature(signed: &SignedInstruction) -> Result<(), ValidationError> {
    signed.verify().map_err(|_| ValidationError::SignatureFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::instruction::Instruction;

    #[test]
    fn test_content_limit_is_inclusive() {
        let limits = Limits::default();
        assert!(validate_content(&"a".repeat(512), &limits).is_ok());
        assert_eq!(
            validate_content(&"a".repeat(513), &limits),
            Err(ValidationError::ContentTooLong { len: 513, max: 512 })
        );
    }

    #[test]
    fn test_empty_content_allowed() {
        assert!(validate_content("", &Limits::default()).is_ok());
    }

    #[test]
    fn test_alias_normalization() {
        let limits = Limits::default();
        assert_eq!(normalize_alias(None, &limits), Ok(None));
        assert_eq!(normalize_alias(Some("   "), &limits), Ok(None));
        assert_eq!(
            normalize_alias(Some("  spling  "), &limits),
            Ok(Some("spling".to_string()))
        );
        assert!(matches!(
            normalize_alias(Some(&"x".repeat(33)), &limits),
            Err(ValidationError::InvalidAlias(_))
        ));
        assert!(normalize_alias(Some("a\u{0}b"), &limits).is_err());
    }

    #[test]
    fn test_tag_normalization() {
        let limits = Limits::default();
        assert_eq!(normalize_tag("  Rust ", &limits), Ok("rust".to_string()));
        assert!(normalize_tag("", &limits).is_err());
        assert!(normalize_tag("two words", &limits).is_err());
        assert!(normalize_tag(&"t".repeat(33), &limits).is_err());
    }

    #[test]
    fn test_signature_validation() {
        let keypair = Keypair::generate();
        let signed = SignedInstruction::sign(&keypair, Instruction::SetupTags).unwrap();
        assert!(validate_signature(&signed).is_ok());

        let forged = SignedInstruction::unsigned(keypair.identity(), Instruction::SetupTags);
        assert_eq!(
            validate_signature(&forged),
            Err(ValidationError::SignatureFailed)
        );
    }
}
