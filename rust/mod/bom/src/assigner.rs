//! Per-row final code decision.
//!
//! Order of precedence:
//! 1. manufactured rows pass their part number through;
//! 2. part numbers that already are commercial codes are reused;
//! 3. rows with a group in their label get a freshly minted code;
//! 4. everything else is `NULO`.
//!
//! Assembly and welding rows pass through only when their part number has
//! the manufactured shape; otherwise they are coded like commercial rows.

use crate::error::OverflowError;
use crate::log::{LogEvent, RunLog, UnresolvedReason};
use crate::model::{extract_group, is_manufactured, PartRow, Process, RowStatus, NULO};
use crate::sequence::SequenceAllocator;

enum Decision {
    Code(String, RowStatus),
    Unresolved(UnresolvedReason),
}

fn decide(row: &PartRow, allocator: &mut SequenceAllocator) -> Result<Decision, OverflowError> {
    let part_number = row.part_number.as_str();

    match row.process.as_ref().unwrap_or(&Process::Commercial) {
        Process::Manufactured => {
            if part_number.is_empty() {
                return Ok(Decision::Unresolved(UnresolvedReason::NoPartNumber));
            }
            Ok(Decision::Code(part_number.to_string(), RowStatus::PassThrough))
        }
        Process::Assembly | Process::Welding if is_manufactured(part_number) => {
            Ok(Decision::Code(part_number.to_string(), RowStatus::PassThrough))
        }
        Process::Other(label) => Ok(Decision::Unresolved(UnresolvedReason::UnknownProcess(
            label.clone(),
        ))),
        _ if allocator.format().is_commercial(part_number) => {
            Ok(Decision::Code(part_number.to_string(), RowStatus::Reused))
        }
        _ => match extract_group(&row.product_group_label) {
            Some(group) => Ok(Decision::Code(allocator.next(group)?, RowStatus::Assigned)),
            None => Ok(Decision::Unresolved(UnresolvedReason::NoGroup)),
        },
    }
}

/// Set `final_code` and `status` on every row, minting through `allocator`.
///
/// Stops at the first overflow; rows after it are left untouched and the
/// caller must discard the batch.
pub fn assign_codes(
    rows: &mut [PartRow],
    allocator: &mut SequenceAllocator,
    log: &mut RunLog,
) -> Result<(), OverflowError> {
    for row in rows.iter_mut() {
        match decide(row, allocator)? {
            Decision::Code(code, status) => {
                if status == RowStatus::Assigned {
                    log.push(LogEvent::CodeAssigned {
                        item_id: row.item_id.clone(),
                        title: row.title.clone(),
                        code: code.clone(),
                    });
                }
                row.final_code = code;
                row.status = Some(status);
            }
            Decision::Unresolved(reason) => {
                log.push(LogEvent::Unresolved {
                    item_id: row.item_id.clone(),
                    title: row.title.clone(),
                    reason,
                });
                row.final_code = NULO.to_string();
                row.status = Some(RowStatus::Unresolved);
            }
        }
    }
    Ok(())
}
