//! Per-group sequence counters: the durable store and the in-run allocator.

pub mod allocator;
pub mod store;

use std::collections::BTreeMap;

pub use allocator::{reconcile, SequenceAllocator};
pub use store::{KvSequenceStore, SequenceStore, Snapshot, COUNTERS_KEY};

/// Group code (three digits) → last issued sequence.
pub type Counters = BTreeMap<String, u64>;

/// Raise `group` in `counters` to at least `value`.
pub fn raise(counters: &mut Counters, group: &str, value: u64) {
    let current = counters.entry(group.to_string()).or_insert(0);
    if value > *current {
        *current = value;
    }
}

/// Per-group maximum of two counter maps.
pub fn merge_max(base: &Counters, other: &Counters) -> Counters {
    let mut merged = base.clone();
    for (group, value) in other {
        raise(&mut merged, group, *value);
    }
    merged
}
