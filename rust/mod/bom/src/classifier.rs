use crate::model::{is_manufactured, PartRow, Process};

/// Category for a row whose process is blank, from its part number alone.
pub fn classify(part_number: &str) -> Process {
    if is_manufactured(part_number) {
        Process::Manufactured
    } else {
        Process::Commercial
    }
}

/// Fill in the process of every row that lacks one. Rows that already carry
/// a process are left alone. Returns how many rows were changed.
pub fn fill_missing_processes(rows: &mut [PartRow]) -> usize {
    let mut filled = 0;
    for row in rows.iter_mut().filter(|r| r.process.is_none()) {
        row.process = Some(classify(&row.part_number));
        filled += 1;
    }
    filled
}
