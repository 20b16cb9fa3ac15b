use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::assigner::assign_codes;
use crate::classifier::fill_missing_processes;
use crate::config::EngineConfig;
use crate::error::BomError;
use crate::hierarchy;
use crate::ingest::Batch;
use crate::log::{LogEvent, RunLog};
use crate::model::{is_group_code, CodeFormat, PartRow};
use crate::presenter::present;
use crate::sequence::{reconcile, Counters, SequenceAllocator, SequenceStore, Snapshot};

/// Result of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    /// Rows in output order.
    pub rows: Vec<PartRow>,

    /// Counters after every allocation of the run.
    pub counters: Counters,

    pub log: RunLog,

    /// False for previews; the store was not written.
    pub committed: bool,

    /// How many times the batch was computed (1 unless a commit race was lost).
    pub attempts: usize,
}

/// The code-assignment pipeline bound to a counter store.
pub struct CodingEngine {
    config: EngineConfig,
    format: CodeFormat,
    store: Arc<dyn SequenceStore>,
}

impl CodingEngine {
    pub fn new(config: EngineConfig, store: Arc<dyn SequenceStore>) -> Result<Self, BomError> {
        config.validate()?;
        let format = CodeFormat::new(config.width)?;
        Ok(Self {
            config,
            format,
            store,
        })
    }

    /// Process a batch and commit the advanced counters.
    ///
    /// The batch is recomputed from a fresh snapshot whenever another run
    /// committed first, up to `max_commit_attempts` times.
    pub fn run(&self, batch: Batch, manual: &Counters) -> Result<RunOutput, BomError> {
        validate_manual(manual)?;

        let max_attempts = self.config.max_commit_attempts;
        for attempt in 1..=max_attempts {
            let snapshot = self.store.load()?;
            let (rows, counters, mut log) = self.process(batch.clone(), manual, &snapshot)?;
            if attempt > 1 {
                log.push(LogEvent::CommitRetried { attempt });
            }

            if self.store.commit(&snapshot, &counters)? {
                log.push(LogEvent::CountersSaved {
                    counters: counters.clone(),
                });
                info!(
                    "run committed: {} rows, {} new codes",
                    rows.len(),
                    log.codes_generated()
                );
                return Ok(RunOutput {
                    rows,
                    counters,
                    log,
                    committed: true,
                    attempts: attempt,
                });
            }
            debug!("run: commit race lost on attempt {}", attempt);
        }

        Err(BomError::StoreConflict {
            attempts: max_attempts,
        })
    }

    /// Process a batch against the current store without writing to it.
    pub fn preview(&self, batch: Batch, manual: &Counters) -> Result<RunOutput, BomError> {
        validate_manual(manual)?;
        let snapshot = self.store.load()?;
        let (rows, counters, log) = self.process(batch, manual, &snapshot)?;
        Ok(RunOutput {
            rows,
            counters,
            log,
            committed: false,
            attempts: 1,
        })
    }

    /// The pure pipeline: classify, reconcile, assign, resolve, present.
    pub fn process(
        &self,
        batch: Batch,
        manual: &Counters,
        snapshot: &Snapshot,
    ) -> Result<(Vec<PartRow>, Counters, RunLog), BomError> {
        let mut log = RunLog::new();
        let Batch {
            mut rows,
            missing_columns,
            duplicate_columns,
        } = batch;

        for column in missing_columns {
            log.push(LogEvent::MissingField {
                column: column.header().to_string(),
            });
        }
        for (column, headers) in duplicate_columns {
            log.push(LogEvent::DuplicateColumn {
                column: column.header().to_string(),
                headers,
            });
        }
        if let Some(reason) = &snapshot.corrupt {
            log.push(LogEvent::StoreCorrupt {
                reason: reason.clone(),
            });
        }
        log.push(LogEvent::CountersLoaded {
            counters: snapshot.counters.clone(),
        });

        let filled = fill_missing_processes(&mut rows);
        log.push(LogEvent::ProcessFilled { count: filled });

        let merged = reconcile(manual, &snapshot.counters, &rows, &self.format);
        log.push(LogEvent::CountersReconciled {
            counters: merged.clone(),
        });

        let mut allocator = SequenceAllocator::for_batch(self.format.clone(), merged, &rows);
        assign_codes(&mut rows, &mut allocator, &mut log)?;

        hierarchy::resolve(&mut rows, &self.config, &mut log);
        present(&mut rows);

        Ok((rows, allocator.into_counters(), log))
    }
}

fn validate_manual(manual: &Counters) -> Result<(), BomError> {
    for group in manual.keys() {
        if !is_group_code(group) {
            return Err(BomError::Validation(format!(
                "counter group must be three digits, got '{group}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Process, NULO};
    use crate::sequence::KvSequenceStore;
    use bomcode_kv::MemoryStore;

    fn engine() -> CodingEngine {
        let store = Arc::new(KvSequenceStore::new(Arc::new(MemoryStore::new())));
        CodingEngine::new(EngineConfig::default(), store).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let store = Arc::new(KvSequenceStore::new(Arc::new(MemoryStore::new())));
        let config = EngineConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            CodingEngine::new(config, store),
            Err(BomError::Config(_))
        ));
    }

    #[test]
    fn rejects_invalid_manual_group() {
        let manual = Counters::from([("10".to_string(), 5)]);
        let err = engine().run(Batch::default(), &manual).unwrap_err();
        assert!(matches!(err, BomError::Validation(_)));
    }

    #[test]
    fn log_order() {
        let batch = Batch::from_rows(vec![
            PartRow::new("1", "X").with_title("Caixa").with_group("100"),
            PartRow::new("2", "Y").with_title("Tampa"),
        ]);
        let out = engine().run(batch, &Counters::new()).unwrap();

        let kinds: Vec<&'static str> = out
            .log
            .events()
            .iter()
            .map(|e| match e {
                LogEvent::CountersLoaded { .. } => "loaded",
                LogEvent::ProcessFilled { .. } => "filled",
                LogEvent::CountersReconciled { .. } => "reconciled",
                LogEvent::CodeAssigned { .. } => "assigned",
                LogEvent::Unresolved { .. } => "unresolved",
                LogEvent::HierarchyResolved { .. } => "hierarchy",
                LogEvent::CountersSaved { .. } => "saved",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["loaded", "filled", "reconciled", "assigned", "unresolved", "hierarchy", "saved"]
        );
        assert!(out.committed);
        assert_eq!(out.attempts, 1);
    }

    #[test]
    fn preview_does_not_commit() {
        let engine = engine();
        let batch = Batch::from_rows(vec![PartRow::new("1", "X").with_group("100")]);

        let first = engine.preview(batch.clone(), &Counters::new()).unwrap();
        let second = engine.preview(batch, &Counters::new()).unwrap();
        assert!(!first.committed);
        assert_eq!(first.rows[0].final_code, "100-0001");
        assert_eq!(second.rows[0].final_code, "100-0001");
    }

    #[test]
    fn overflow_aborts_without_commit() {
        let kv = Arc::new(MemoryStore::new());
        let store = Arc::new(KvSequenceStore::new(kv));
        let engine = CodingEngine::new(EngineConfig::default(), store.clone()).unwrap();
        store
            .raise(&Counters::from([("100".to_string(), 9998)]), 1)
            .unwrap();

        let batch = Batch::from_rows(vec![
            PartRow::new("1", "A").with_group("200"),
            PartRow::new("2", "B").with_group("100"),
            PartRow::new("3", "C").with_group("100"),
        ]);
        let err = engine.run(batch, &Counters::new()).unwrap_err();
        assert!(matches!(err, BomError::Overflow(ref e) if e.group == "100"));

        // Nothing from the failed run was persisted, not even group 200.
        assert_eq!(
            store.load().unwrap().counters,
            Counters::from([("100".to_string(), 9998)])
        );
    }

    #[test]
    fn missing_columns_logged_first() {
        let batch = crate::ingest::ingest(vec![crate::ingest::RawRecord::from([
            ("ITEM ID".to_string(), "1".to_string()),
            ("PART NUMBER".to_string(), "12-3456-7890-A".to_string()),
        ])]);
        let out = engine().run(batch, &Counters::new()).unwrap();

        assert_eq!(
            out.log.events()[0],
            LogEvent::MissingField {
                column: "TITLE".into()
            }
        );
        assert_eq!(out.rows[0].process, Some(Process::Manufactured));
        assert_ne!(out.rows[0].final_code, NULO);
    }

    #[test]
    fn aliased_headers_are_logged() {
        let batch = crate::ingest::ingest(vec![crate::ingest::RawRecord::from([
            ("ITEM".to_string(), "1".to_string()),
            ("ITEM ID".to_string(), "2".to_string()),
            ("PART NUMBER".to_string(), "12-3456-7890-A".to_string()),
        ])]);
        let out = engine().run(batch, &Counters::new()).unwrap();

        assert_eq!(out.rows[0].item_id, "1");
        assert!(out.log.events().contains(&LogEvent::DuplicateColumn {
            column: "ITEM ID".into(),
            headers: vec!["ITEM".into(), "ITEM ID".into()],
        }));
    }
}
