//! Ledger configuration.
//!
//! Loadable from TOML. Program ids are written in base58:
//!
//! ```toml
//! program_id = "BfZEDfZLyTkNgdotvwokkayzHxCYJZQqFQM8BMc9kSza"
//! thread_program_id = "3XXuUFfweXBwFgFfYaejLvZE4cGZiHgKiGfMtdxNzYmv"
//! max_content_len = 512
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use spling_core::{Limits, ProgramId};
use thiserror::Error;

/// Program id of the deployed Spling protocol.
pub const DEFAULT_PROGRAM_ID: ProgramId = ProgramId::from_bytes([
    0x9e, 0x75, 0x61, 0x55, 0xb7, 0x33, 0x02, 0x79, 0xd6, 0x2c, 0xe1, 0x9b, 0x4b, 0x9b, 0x2a, 0x9f,
    0x03, 0x57, 0x23, 0x89, 0x69, 0x04, 0x8d, 0x0d, 0x13, 0x72, 0xe8, 0xa8, 0x1a, 0x10, 0x78, 0xa7,
]);

/// Program id of the Clockwork thread protocol.
pub const DEFAULT_THREAD_PROGRAM_ID: ProgramId = ProgramId::from_bytes([
    0x25, 0x89, 0xbd, 0xfc, 0x12, 0xf5, 0xb9, 0xff, 0x44, 0x8e, 0xda, 0x50, 0x98, 0x62, 0x25, 0x3d,
    0x7a, 0x84, 0xf8, 0x7a, 0x58, 0x37, 0x51, 0xfe, 0x87, 0x27, 0xcd, 0xac, 0x01, 0xc7, 0x18, 0xa1,
]);

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Program that owns every address the ledger derives.
    #[serde(default = "default_program_id", with = "base58")]
    pub program_id: ProgramId,

    /// External thread protocol. Thread roots are derived under this id.
    #[serde(default = "default_thread_program_id", with = "base58")]
    pub thread_program_id: ProgramId,

    /// Post and reply bodies, in bytes.
    #[serde(default = "default_max_content_len")]
    pub max_content_len: usize,

    #[serde(default = "default_max_name_len")]
    pub max_alias_len: usize,

    #[serde(default = "default_max_name_len")]
    pub max_tag_len: usize,

    #[serde(default = "default_max_tags")]
    pub max_tags: usize,

    /// Commit attempts before an instruction gives up with `Contention`.
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,

    /// Check signatures in `Ledger::execute`.
    #[serde(default = "default_true")]
    pub verify_signatures: bool,
}

fn default_program_id() -> ProgramId {
    DEFAULT_PROGRAM_ID
}

fn default_thread_program_id() -> ProgramId {
    DEFAULT_THREAD_PROGRAM_ID
}

fn default_max_content_len() -> usize {
    512
}

fn default_max_name_len() -> usize {
    32
}

fn default_max_tags() -> usize {
    256
}

fn default_max_commit_attempts() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            thread_program_id: DEFAULT_THREAD_PROGRAM_ID,
            max_content_len: default_max_content_len(),
            max_alias_len: default_max_name_len(),
            max_tag_len: default_max_name_len(),
            max_tags: default_max_tags(),
            max_commit_attempts: default_max_commit_attempts(),
            verify_signatures: true,
        }
    }
}

impl LedgerConfig {
    /// Load config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_commit_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_commit_attempts must be at least 1".into(),
            ));
        }
        // tag indices are u16
        if self.max_tags > usize::from(u16::MAX) + 1 {
            return Err(ConfigError::Invalid(format!(
                "max_tags {} exceeds {}",
                self.max_tags,
                usize::from(u16::MAX) + 1
            )));
        }
        if self.program_id == self.thread_program_id {
            return Err(ConfigError::Invalid(
                "thread_program_id must differ from program_id".into(),
            ));
        }
        Ok(())
    }

    /// Text limits for validation.
    pub fn limits(&self) -> Limits {
        Limits {
            max_content_len: self.max_content_len,
            max_alias_len: self.max_alias_len,
            max_tag_len: self.max_tag_len,
            max_tags: self.max_tags,
        }
    }
}

/// Serde adapter writing a [`ProgramId`] as base58 text.
mod base58 {
    use serde::{Deserialize, Deserializer, Serializer};
    use spling_core::ProgramId;

    pub fn serialize<S: Serializer>(id: &ProgramId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_base58())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProgramId, D::Error> {
        let text = String::deserialize(deserializer)?;
        ProgramId::from_base58(&text).map_err(serde::de::Error::custom)
    }
}
