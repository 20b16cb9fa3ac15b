use std::sync::Arc;

use bomcode_kv::{KVError, KVStore};
use tracing::{debug, warn};

use super::{merge_max, Counters};
use crate::error::BomError;
use crate::model::is_group_code;

/// KV key holding the counter document.
pub const COUNTERS_KEY: &str = "seq:counters";

/// Counters as read at the start of a run, plus the version token the
/// commit is checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub counters: Counters,

    /// Set when the stored document could not be decoded and was treated as
    /// empty.
    pub corrupt: Option<String>,

    version: Option<Vec<u8>>,
}

impl Snapshot {
    /// Snapshot of a store that has never been written.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Durable per-group counters.
///
/// A run is `load` → compute → `commit`. `commit` only succeeds when the
/// store still holds exactly what `load` returned, so two runs racing on one
/// store cannot both advance from the same starting point.
pub trait SequenceStore: Send + Sync {
    fn load(&self) -> Result<Snapshot, BomError>;

    /// Replace the stored counters with `counters` merged over the snapshot.
    ///
    /// Returns `false`, writing nothing, when the store changed since
    /// `snapshot` was loaded. Counters never move below the snapshot.
    fn commit(&self, snapshot: &Snapshot, counters: &Counters) -> Result<bool, BomError>;

    /// Raise stored counters to at least `manual`, retrying lost races.
    /// Returns the counters now stored.
    fn raise(&self, manual: &Counters, max_attempts: usize) -> Result<Counters, BomError> {
        for attempt in 1..=max_attempts {
            let snapshot = self.load()?;
            let merged = merge_max(&snapshot.counters, manual);
            if merged == snapshot.counters && snapshot.corrupt.is_none() {
                return Ok(merged);
            }
            if self.commit(&snapshot, &merged)? {
                return Ok(merged);
            }
            debug!("raise: lost commit race on attempt {}", attempt);
        }
        Err(BomError::StoreConflict {
            attempts: max_attempts,
        })
    }
}

/// SequenceStore over any KVStore. The whole counter map is one JSON object
/// (`{"100": 2, "205": 17}`) under a single key, which is what makes the
/// compare-and-swap cover every group at once.
pub struct KvSequenceStore {
    kv: Arc<dyn KVStore>,
    key: String,
}

impl KvSequenceStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self::with_key(kv, COUNTERS_KEY)
    }

    pub fn with_key(kv: Arc<dyn KVStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }
}

/// Decode a counter document. Entries whose key is not a three-digit group
/// are dropped.
pub fn decode_counters(raw: &[u8]) -> Result<Counters, String> {
    let decoded: Counters = serde_json::from_slice(raw).map_err(|e| e.to_string())?;
    let mut counters = Counters::new();
    for (group, value) in decoded {
        if is_group_code(&group) {
            counters.insert(group, value);
        } else {
            warn!("counter store: ignoring entry with invalid group '{}'", group);
        }
    }
    Ok(counters)
}

pub fn encode_counters(counters: &Counters) -> Result<Vec<u8>, KVError> {
    serde_json::to_vec(counters).map_err(|e| KVError::Serialization(e.to_string()))
}

impl SequenceStore for KvSequenceStore {
    fn load(&self) -> Result<Snapshot, BomError> {
        let Some(raw) = self.kv.get(&self.key)? else {
            return Ok(Snapshot::empty());
        };

        let snapshot = match decode_counters(&raw) {
            Ok(counters) => Snapshot {
                counters,
                corrupt: None,
                version: Some(raw),
            },
            Err(reason) => {
                warn!("counter store: unreadable document under {}: {}", self.key, reason);
                Snapshot {
                    counters: Counters::new(),
                    corrupt: Some(reason),
                    version: Some(raw),
                }
            }
        };
        Ok(snapshot)
    }

    fn commit(&self, snapshot: &Snapshot, counters: &Counters) -> Result<bool, BomError> {
        let merged = merge_max(&snapshot.counters, counters);
        let doc = encode_counters(&merged)?;
        let swapped = self
            .kv
            .compare_and_swap(&self.key, snapshot.version.as_deref(), &doc)?;
        Ok(swapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomcode_kv::MemoryStore;

    fn store() -> (Arc<MemoryStore>, KvSequenceStore) {
        let kv = Arc::new(MemoryStore::new());
        let seq = KvSequenceStore::new(kv.clone());
        (kv, seq)
    }

    fn counters(entries: &[(&str, u64)]) -> Counters {
        entries.iter().map(|(g, v)| (g.to_string(), *v)).collect()
    }

    #[test]
    fn absent_store_is_empty() {
        let (_kv, seq) = store();
        let snapshot = seq.load().unwrap();
        assert!(snapshot.counters.is_empty());
        assert!(snapshot.corrupt.is_none());
    }

    #[test]
    fn corrupt_document_is_empty_and_replaceable() {
        let (kv, seq) = store();
        kv.set(COUNTERS_KEY, b"not json").unwrap();

        let snapshot = seq.load().unwrap();
        assert!(snapshot.counters.is_empty());
        assert!(snapshot.corrupt.is_some());

        assert!(seq.commit(&snapshot, &counters(&[("100", 1)])).unwrap());
        assert_eq!(seq.load().unwrap().counters, counters(&[("100", 1)]));
    }

    #[test]
    fn invalid_groups_are_dropped() {
        let (kv, seq) = store();
        kv.set(COUNTERS_KEY, br#"{"100": 4, "ab": 3, "1000": 9}"#).unwrap();
        assert_eq!(seq.load().unwrap().counters, counters(&[("100", 4)]));
    }

    #[test]
    fn stale_snapshot_cannot_commit() {
        let (_kv, seq) = store();
        let first = seq.load().unwrap();
        let second = seq.load().unwrap();

        assert!(seq.commit(&first, &counters(&[("100", 2)])).unwrap());
        assert!(!seq.commit(&second, &counters(&[("100", 2)])).unwrap());
        assert_eq!(seq.load().unwrap().counters, counters(&[("100", 2)]));
    }

    #[test]
    fn commit_never_lowers() {
        let (kv, seq) = store();
        kv.set(COUNTERS_KEY, br#"{"100": 10}"#).unwrap();
        let snapshot = seq.load().unwrap();

        assert!(seq.commit(&snapshot, &counters(&[("100", 3), ("200", 1)])).unwrap());
        assert_eq!(
            seq.load().unwrap().counters,
            counters(&[("100", 10), ("200", 1)])
        );
    }

    #[test]
    fn raise_is_monotonic() {
        let (_kv, seq) = store();
        let after = seq.raise(&counters(&[("100", 7)]), 3).unwrap();
        assert_eq!(after, counters(&[("100", 7)]));

        let after = seq.raise(&counters(&[("100", 2), ("300", 1)]), 3).unwrap();
        assert_eq!(after, counters(&[("100", 7), ("300", 1)]));
        assert_eq!(seq.load().unwrap().counters, after);
    }
}
