//! Parent codes from dotted item ids.
//!
//! `"1.2.3"` has ancestors `"1.2"` and `"1"`. A row's parent code is the
//! final code of its nearest ancestor present in the batch; with
//! [`ParentLookup::SkipUnresolved`] ancestors coded `NULO` are walked past.

use std::collections::HashMap;

use crate::config::{EngineConfig, Inheritance, ParentLookup};
use crate::log::{LogEvent, RunLog};
use crate::model::{PartRow, RowStatus, NULO};

/// item id → final code, first occurrence wins.
pub type CodeMap<'a> = HashMap<&'a str, &'a str>;

/// Index rows by item id. Returns the map and the ids seen more than once.
pub fn build_code_map(rows: &[PartRow]) -> (CodeMap<'_>, Vec<String>) {
    let mut map = CodeMap::with_capacity(rows.len());
    let mut duplicates = Vec::new();
    for row in rows {
        if map.contains_key(row.item_id.as_str()) {
            duplicates.push(row.item_id.clone());
            continue;
        }
        map.insert(row.item_id.as_str(), row.final_code.as_str());
    }
    (map, duplicates)
}

/// Code of the nearest qualifying strict ancestor of `item_id`.
///
/// Ids without a `.` have no ancestors. Malformed ids (`"1..2"`, `".3"`)
/// are walked the same way and simply fail to match.
pub fn find_parent_code<'a>(
    item_id: &str,
    codes: &CodeMap<'a>,
    lookup: ParentLookup,
) -> Option<&'a str> {
    let mut current = item_id;
    while let Some((prefix, _)) = current.rsplit_once('.') {
        if let Some(&code) = codes.get(prefix) {
            match lookup {
                ParentLookup::NearestAncestor => return Some(code),
                ParentLookup::SkipUnresolved if code != NULO => return Some(code),
                ParentLookup::SkipUnresolved => {}
            }
        }
        current = prefix;
    }
    None
}

/// First descendant of `item_id` in `rows`, in row order.
fn first_descendant<'a>(item_id: &str, rows: &'a [PartRow]) -> Option<&'a PartRow> {
    if item_id.is_empty() {
        return None;
    }
    let prefix = format!("{item_id}.");
    rows.iter().find(|r| r.item_id.starts_with(&prefix))
}

/// Set `parent_code` on every row from the current final codes. Returns how
/// many rows got a parent and the item ids seen more than once.
fn link_parents(rows: &mut [PartRow], lookup: ParentLookup) -> (usize, Vec<String>) {
    let (parents, duplicates) = {
        let (codes, duplicates) = build_code_map(rows);
        let parents: Vec<String> = rows
            .iter()
            .map(|row| {
                find_parent_code(&row.item_id, &codes, lookup)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        (parents, duplicates)
    };

    let mut with_parent = 0;
    for (row, parent) in rows.iter_mut().zip(parents) {
        if !parent.is_empty() {
            with_parent += 1;
        }
        row.parent_code = parent;
    }
    (with_parent, duplicates)
}

/// Resolve parent codes for every row, then run the inheritance pass when
/// enabled. Rows must already carry their final codes.
///
/// With [`ParentLookup::NearestAncestor`] a child may point at a `NULO`
/// ancestor; if that ancestor then inherits a code, parents are linked again
/// so every parent code is the final code of a real ancestor.
pub fn resolve(rows: &mut [PartRow], config: &EngineConfig, log: &mut RunLog) {
    let (with_parent, duplicates) = link_parents(rows, config.parent_lookup);

    for item_id in duplicates {
        log.push(LogEvent::DuplicateItemId { item_id });
    }
    log.push(LogEvent::HierarchyResolved {
        with_parent,
        without_parent: rows.len() - with_parent,
    });

    if config.inheritance == Inheritance::FirstDescendant {
        let adopted = inherit_from_descendants(rows, log);
        if adopted > 0 && config.parent_lookup == ParentLookup::NearestAncestor {
            link_parents(rows, config.parent_lookup);
        }
    }
}

/// Give each `NULO` row the code of its first descendant, if that
/// descendant is coded. Decisions are made against the codes as they stood
/// before the pass, so inheritance never chains. Returns how many rows
/// adopted a code.
pub fn inherit_from_descendants(rows: &mut [PartRow], log: &mut RunLog) -> usize {
    let adoptions: Vec<(usize, String, String)> = {
        let rows: &[PartRow] = rows;
        rows.iter()
            .enumerate()
            .filter(|(_, row)| row.final_code == NULO)
            .filter_map(|(idx, row)| {
                let child = first_descendant(&row.item_id, rows)?;
                (child.final_code != NULO)
                    .then(|| (idx, child.item_id.clone(), child.final_code.clone()))
            })
            .collect()
    };

    let adopted = adoptions.len();
    for (idx, from_item_id, code) in adoptions {
        let row = &mut rows[idx];
        log.push(LogEvent::CodeInherited {
            item_id: row.item_id.clone(),
            title: row.title.clone(),
            from_item_id,
            code: code.clone(),
        });
        row.final_code = code;
        row.status = Some(RowStatus::Inherited);
    }
    adopted
}
