use std::collections::HashSet;

use super::{merge_max, raise, Counters};
use crate::error::OverflowError;
use crate::model::{CodeFormat, PartRow};

/// Starting counters for a run: per group, the maximum of the operator's
/// values, the persisted values, and the highest sequence among part numbers
/// in the batch that already are commercial codes.
pub fn reconcile(
    manual: &Counters,
    persisted: &Counters,
    rows: &[PartRow],
    format: &CodeFormat,
) -> Counters {
    let mut merged = merge_max(persisted, manual);
    for row in rows {
        if let Some((group, sequence)) = format.parse(&row.part_number) {
            raise(&mut merged, group, sequence);
        }
    }
    merged
}

/// Hands out the next free commercial code per group.
pub struct SequenceAllocator {
    format: CodeFormat,
    counters: Counters,
    /// Codes present in the batch, pre-existing or minted here.
    taken: HashSet<String>,
}

impl SequenceAllocator {
    pub fn new(format: CodeFormat, counters: Counters) -> Self {
        Self {
            format,
            counters,
            taken: HashSet::new(),
        }
    }

    /// Allocator seeded with every commercial-shaped part number in `rows`.
    pub fn for_batch(format: CodeFormat, counters: Counters, rows: &[PartRow]) -> Self {
        let mut allocator = Self::new(format, counters);
        for row in rows {
            if allocator.format.is_commercial(&row.part_number) {
                allocator.reserve(row.part_number.clone());
            }
        }
        allocator
    }

    /// Mark a code as already present so `next` skips it.
    pub fn reserve(&mut self, code: String) {
        self.taken.insert(code);
    }

    pub fn format(&self) -> &CodeFormat {
        &self.format
    }

    pub fn counter(&self, group: &str) -> u64 {
        self.counters.get(group).copied().unwrap_or(0)
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn into_counters(self) -> Counters {
        self.counters
    }

    /// Mint the next code for `group`.
    ///
    /// Skips forward past codes already taken in the batch and leaves the
    /// counter on the sequence it returned. On overflow nothing changes.
    pub fn next(&mut self, group: &str) -> Result<String, OverflowError> {
        debug_assert!(crate::model::is_group_code(group), "bad group {group:?}");

        let max = self.format.max_sequence();
        let mut sequence = self.counter(group);
        loop {
            if sequence >= max {
                return Err(OverflowError {
                    group: group.to_string(),
                    counter: sequence,
                    max,
                    width: self.format.width(),
                });
            }
            sequence += 1;
            let code = self.format.format(group, sequence);
            if self.taken.insert(code.clone()) {
                self.counters.insert(group.to_string(), sequence);
                return Ok(code);
            }
        }
    }
}
