use bomcode_kv::KVError;
use thiserror::Error;

use crate::config::ConfigError;

/// Raised when a group's sequence would exceed the numeric capacity of the
/// configured code width. Fatal for the run: nothing is committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("sequence overflow for group {group}: counter {counter} is at the {width}-digit limit {max}")]
pub struct OverflowError {
    pub group: String,
    pub counter: u64,
    pub max: u64,
    pub width: usize,
}

/// Errors surfaced by the coding engine.
///
/// Everything else the engine meets (missing columns, corrupt counter
/// documents, rows without a group) is soft and lands in the run log.
#[derive(Error, Debug)]
pub enum BomError {
    #[error(transparent)]
    Overflow(#[from] OverflowError),

    #[error("counter store: {0}")]
    Store(#[from] KVError),

    #[error("counter store changed concurrently; gave up after {attempts} attempts")]
    StoreConflict { attempts: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_names_group() {
        let err = BomError::from(OverflowError {
            group: "900".into(),
            counter: 999_999,
            max: 999_999,
            width: 6,
        });
        let msg = err.to_string();
        assert!(msg.contains("group 900"), "{msg}");
        assert!(msg.contains("6-digit"), "{msg}");
    }

    #[test]
    fn conflict_message() {
        let err = BomError::StoreConflict { attempts: 3 };
        assert_eq!(
            err.to_string(),
            "counter store changed concurrently; gave up after 3 attempts"
        );
    }
}
