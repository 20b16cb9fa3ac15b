//! Ordered processing log.
//!
//! Every event is kept as data (tests match on variants, the CLI renders
//! them) and mirrored to `tracing` as it is recorded.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::sequence::Counters;

/// Why a row ended up `NULO`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum UnresolvedReason {
    /// No three-digit group in the product group label.
    NoGroup,
    /// Row flagged as manufactured but without a part number.
    NoPartNumber,
    /// Process label the engine does not know how to code.
    UnknownProcess(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "event")]
pub enum LogEvent {
    MissingField {
        column: String,
    },
    DuplicateColumn {
        column: String,
        headers: Vec<String>,
    },
    DuplicateItemId {
        item_id: String,
    },
    StoreCorrupt {
        reason: String,
    },
    CountersLoaded {
        counters: Counters,
    },
    ProcessFilled {
        count: usize,
    },
    CountersReconciled {
        counters: Counters,
    },
    CodeAssigned {
        item_id: String,
        title: String,
        code: String,
    },
    Unresolved {
        item_id: String,
        title: String,
        reason: UnresolvedReason,
    },
    CodeInherited {
        item_id: String,
        title: String,
        from_item_id: String,
        code: String,
    },
    HierarchyResolved {
        with_parent: usize,
        without_parent: usize,
    },
    CommitRetried {
        attempt: usize,
    },
    CountersSaved {
        counters: Counters,
    },
}

impl LogEvent {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            LogEvent::MissingField { .. }
                | LogEvent::DuplicateColumn { .. }
                | LogEvent::DuplicateItemId { .. }
                | LogEvent::StoreCorrupt { .. }
                | LogEvent::Unresolved { .. }
                | LogEvent::CommitRetried { .. }
        )
    }
}

fn fmt_counters(counters: &Counters) -> String {
    if counters.is_empty() {
        return "none".to_string();
    }
    counters
        .iter()
        .map(|(group, seq)| format!("{group}={seq}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::MissingField { column } => {
                write!(f, "Column '{column}' missing from input; created empty")
            }
            LogEvent::DuplicateColumn { column, headers } => {
                let used = headers.first().map(String::as_str).unwrap_or("");
                write!(
                    f,
                    "Headers {} all name column '{column}'; using '{used}'",
                    headers
                        .iter()
                        .map(|h| format!("'{h}'"))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            LogEvent::DuplicateItemId { item_id } => {
                write!(f, "Item '{item_id}' appears more than once; first occurrence used for hierarchy")
            }
            LogEvent::StoreCorrupt { reason } => {
                write!(f, "Counter store unreadable ({reason}); starting from empty")
            }
            LogEvent::CountersLoaded { counters } => {
                write!(f, "Counters loaded: {}", fmt_counters(counters))
            }
            LogEvent::ProcessFilled { count } => {
                write!(f, "Process filled in for {count} rows")
            }
            LogEvent::CountersReconciled { counters } => {
                write!(f, "Counters after batch scan: {}", fmt_counters(counters))
            }
            LogEvent::CodeAssigned { title, code, .. } => {
                write!(f, "'{title}' received code: {code}")
            }
            LogEvent::Unresolved { item_id, title, reason } => match reason {
                UnresolvedReason::NoGroup => {
                    write!(f, "'{title}' (item {item_id}) has no product group -> NULO")
                }
                UnresolvedReason::NoPartNumber => {
                    write!(f, "'{title}' (item {item_id}) has no part number -> NULO")
                }
                UnresolvedReason::UnknownProcess(label) => {
                    write!(f, "'{title}' (item {item_id}) has unknown process '{label}' -> NULO")
                }
            },
            LogEvent::CodeInherited { title, from_item_id, code, .. } => {
                write!(f, "'{title}' inherited code {code} from item {from_item_id}")
            }
            LogEvent::HierarchyResolved { with_parent, without_parent } => {
                write!(
                    f,
                    "Hierarchy resolved: {with_parent} rows with parent code, {without_parent} without"
                )
            }
            LogEvent::CommitRetried { attempt } => {
                write!(f, "Counter store changed during the run; recomputing (attempt {attempt})")
            }
            LogEvent::CountersSaved { counters } => {
                write!(f, "Counters saved: {}", fmt_counters(counters))
            }
        }
    }
}

/// The ordered event log of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunLog {
    events: Vec<LogEvent>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LogEvent) {
        if event.is_warning() {
            warn!("{}", event);
        } else {
            info!("{}", event);
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    /// Number of commercial codes minted in this run.
    pub fn codes_generated(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, LogEvent::CodeAssigned { .. }))
            .count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }

    /// Human-readable lines, led by a one-line summary.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.events.len() + 1);
        lines.push(format!(
            "Processing finished. {} new commercial codes were generated.",
            self.codes_generated()
        ));
        lines.extend(self.events.iter().map(ToString::to_string));
        lines
    }
}
