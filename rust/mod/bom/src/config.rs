//! Engine configuration.
//!
//! One deployment picks one code width and uses it for both minting and
//! recognising commercial codes. The two hierarchy policies are explicit so
//! callers opt into the lossy behaviours instead of inheriting them silently.

use serde::{Deserialize, Serialize};

/// Default number of digits in the sequence part of a commercial code.
pub const DEFAULT_WIDTH: usize = 4;

/// Widest supported sequence. `10^9 - 1` still fits comfortably in a `u64`.
pub const MAX_WIDTH: usize = 9;

/// How `findParentCode` treats ancestors whose own code is `NULO`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParentLookup {
    /// Keep walking past unresolved ancestors to the nearest coded one.
    #[default]
    SkipUnresolved,
    /// Stop at the nearest ancestor present in the batch, even if `NULO`.
    NearestAncestor,
}

/// Whether an unresolved parent may adopt a descendant's code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Inheritance {
    #[default]
    Disabled,
    /// Adopt the code of the first descendant in input order, when that
    /// descendant is coded. Parent codes are resolved before this pass.
    FirstDescendant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Digits in the sequence part of a commercial code (`100-0001` → 4).
    pub width: usize,

    pub parent_lookup: ParentLookup,

    pub inheritance: Inheritance,

    /// How many times a run is recomputed after losing the store commit race.
    pub max_commit_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            parent_lookup: ParentLookup::default(),
            inheritance: Inheritance::default(),
            max_commit_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("code width must be between 1 and 9, got {0}")]
    WidthOutOfRange(usize),

    #[error("maxCommitAttempts must be at least 1")]
    NoCommitAttempts,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(ConfigError::WidthOutOfRange(self.width));
        }
        if self.max_commit_attempts == 0 {
            return Err(ConfigError::NoCommitAttempts);
        }
        Ok(())
    }
}
