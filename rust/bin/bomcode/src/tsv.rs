//! Tab-separated BOM exports.
//!
//! First non-blank line is the header. Short lines are padded with empty
//! cells; cells past the header are dropped. A header repeated verbatim keeps
//! its first column.

use bom::{Column, PartRow, RawRecord};
use tracing::warn;

pub fn parse(input: &str) -> Vec<RawRecord> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_line.split('\t').map(|h| h.trim().to_string()).collect();
    for (idx, header) in headers.iter().enumerate() {
        if headers[..idx].contains(header) {
            warn!("header '{}' repeated in column {}; keeping the first", header, idx + 1);
        }
    }

    lines
        .map(|line| {
            let mut record = RawRecord::new();
            let mut cells = line.split('\t');
            for header in &headers {
                let cell = cells.next().unwrap_or("").to_string();
                record.entry(header.clone()).or_insert(cell);
            }
            record
        })
        .collect()
}

fn clean(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

/// Extra column names in order of first appearance.
pub fn extra_headers(rows: &[PartRow]) -> Vec<String> {
    let mut extra: Vec<String> = Vec::new();
    for row in rows {
        for key in row.extra.keys() {
            if !extra.contains(key) {
                extra.push(key.clone());
            }
        }
    }
    extra
}

pub fn render(rows: &[PartRow]) -> String {
    let extra = extra_headers(rows);
    let mut out = String::new();

    let header: Vec<&str> = Column::OUTPUT
        .iter()
        .map(|c| c.header())
        .chain(extra.iter().map(String::as_str))
        .collect();
    out.push_str(&header.join("\t"));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = Column::OUTPUT
            .iter()
            .map(|c| clean(c.value(row)))
            .chain(
                extra
                    .iter()
                    .map(|k| clean(row.extra.get(k).map(String::as_str).unwrap_or(""))),
            )
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}
