//! Output ordering and casing.
//!
//! Rows are ordered by tier then final code; ties keep input order. Text
//! fields are uppercased. Identifiers (item id, part number, final and
//! parent codes) are never touched.

use crate::model::{PartRow, Process, NULO};

/// 1: manufactured family, 2: coded commercial, 3: everything else.
pub fn sort_tier(row: &PartRow) -> u8 {
    let coded = row.final_code != NULO;
    match row.process.as_ref() {
        Some(Process::Manufactured) => 1,
        Some(Process::Assembly | Process::Welding) if coded => 1,
        Some(Process::Commercial) if coded => 2,
        _ => 3,
    }
}

fn uppercase_in_place(value: &mut String) {
    if value.chars().any(char::is_lowercase) {
        *value = value.to_uppercase();
    }
}

/// Uppercase the descriptive fields of a row.
pub fn normalize_case(row: &mut PartRow) {
    uppercase_in_place(&mut row.title);
    uppercase_in_place(&mut row.quantity);
    uppercase_in_place(&mut row.product_group_label);
    uppercase_in_place(&mut row.material);
    uppercase_in_place(&mut row.dimensions);
    if let Some(Process::Other(label)) = row.process.as_mut() {
        uppercase_in_place(label);
    }
    for value in row.extra.values_mut() {
        uppercase_in_place(value);
    }
}

/// Order rows for output and normalize their casing.
pub fn present(rows: &mut [PartRow]) {
    // `sort_by` is stable.
    rows.sort_by(|a, b| {
        sort_tier(a)
            .cmp(&sort_tier(b))
            .then_with(|| a.final_code.cmp(&b.final_code))
    });
    rows.iter_mut().for_each(normalize_case);
}
