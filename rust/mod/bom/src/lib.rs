//! BOM code-assignment engine.
//!
//! Rows of a hierarchical bill of materials get a final code: in-house part
//! numbers pass through, commercial parts get `GGG-NNNN` codes drawn from a
//! durable per-group counter, and every row learns the code of its nearest
//! coded ancestor.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bom::{Batch, CodingEngine, Counters, EngineConfig, KvSequenceStore, PartRow};
//! use bomcode_kv::MemoryStore;
//!
//! let store = Arc::new(KvSequenceStore::new(Arc::new(MemoryStore::new())));
//! let engine = CodingEngine::new(EngineConfig::default(), store).unwrap();
//!
//! let batch = Batch::from_rows(vec![
//!     PartRow::new("1", "PARAFUSO M6").with_group("100 - FIXADORES"),
//!     PartRow::new("1.1", "PORCA M6").with_group("100 - FIXADORES"),
//! ]);
//! let out = engine.run(batch, &Counters::new()).unwrap();
//! assert_eq!(out.rows[1].parent_code, "100-0001");
//! ```

pub mod assigner;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod ingest;
pub mod log;
pub mod model;
pub mod presenter;
pub mod sequence;

pub use config::{ConfigError, EngineConfig, Inheritance, ParentLookup};
pub use engine::{CodingEngine, RunOutput};
pub use error::{BomError, OverflowError};
pub use ingest::{ingest, Batch, Column, RawRecord};
pub use log::{LogEvent, RunLog, UnresolvedReason};
pub use model::{CodeFormat, PartRow, Process, RowStatus, NULO};
pub use sequence::{Counters, KvSequenceStore, SequenceAllocator, SequenceStore, Snapshot};
