//! Typed ingestion of loosely-typed tabular records.
//!
//! A record is a column name → cell map as produced by any table reader.
//! Headers are matched case-insensitively against English names and the
//! Portuguese headers used by the engineering BOM exports.

use std::collections::{BTreeMap, HashSet};

use crate::model::{PartRow, Process};

/// Column name → cell text.
pub type RawRecord = BTreeMap<String, String>;

/// The columns the engine understands, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ItemId,
    Title,
    PartNumber,
    Process,
    GroupLabel,
    Material,
    Dimensions,
    FinalCode,
    ParentCode,
    Quantity,
}

impl Column {
    /// Input columns, required first.
    pub const INPUT: [Column; 8] = [
        Column::ItemId,
        Column::PartNumber,
        Column::Title,
        Column::Quantity,
        Column::Process,
        Column::GroupLabel,
        Column::Material,
        Column::Dimensions,
    ];

    /// Output column order; unknown input columns follow.
    pub const OUTPUT: [Column; 10] = [
        Column::ItemId,
        Column::Title,
        Column::PartNumber,
        Column::Process,
        Column::GroupLabel,
        Column::Material,
        Column::Dimensions,
        Column::FinalCode,
        Column::ParentCode,
        Column::Quantity,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::ItemId => "ITEM ID",
            Column::Title => "TITLE",
            Column::PartNumber => "PART NUMBER",
            Column::Process => "PROCESS",
            Column::GroupLabel => "PRODUCT GROUP",
            Column::Material => "MATERIAL",
            Column::Dimensions => "DIMENSIONS",
            Column::FinalCode => "FINAL CODE",
            Column::ParentCode => "PARENT CODE",
            Column::Quantity => "QUANTITY",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::ItemId => &["ITEM ID", "ITEM", "Nº DO ITEM", "N° DO ITEM", "NO. DO ITEM"],
            Column::Title => &["TITLE", "TÍTULO", "TITULO", "DESCRIPTION"],
            Column::PartNumber => &["PART NUMBER", "Nº DA PEÇA", "N° DA PEÇA", "NO. DA PECA", "PART NO."],
            Column::Process => &["PROCESS", "PROCESSO"],
            Column::GroupLabel => &["PRODUCT GROUP", "GRUPO DE PRODUTO", "GROUP"],
            Column::Material => &["MATERIAL"],
            Column::Dimensions => &["DIMENSIONS", "DIMENSÕES", "DIMENSOES"],
            Column::FinalCode => &["FINAL CODE", "CÓDIGO FINAL"],
            Column::ParentCode => &["PARENT CODE", "CÓDIGO PAI"],
            Column::Quantity => &["QUANTITY", "QTY", "QTD.", "QTD", "QUANTIDADE"],
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, Column::Material | Column::Dimensions)
    }

    /// Column a header names, if any.
    pub fn from_header(header: &str) -> Option<Column> {
        let normalized = header.trim().to_uppercase();
        Self::OUTPUT
            .into_iter()
            .find(|c| c.aliases().iter().any(|a| *a == normalized))
    }

    /// The cell of this column in an output row.
    pub fn value(self, row: &PartRow) -> &str {
        match self {
            Column::ItemId => &row.item_id,
            Column::Title => &row.title,
            Column::PartNumber => &row.part_number,
            Column::Process => row.process_label(),
            Column::GroupLabel => &row.product_group_label,
            Column::Material => &row.material,
            Column::Dimensions => &row.dimensions,
            Column::FinalCode => &row.final_code,
            Column::ParentCode => &row.parent_code,
            Column::Quantity => &row.quantity,
        }
    }
}

/// Rows ready for the engine plus the header problems found on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub rows: Vec<PartRow>,
    /// Required columns absent from every record.
    pub missing_columns: Vec<Column>,
    /// Columns named by more than one header, with those headers in the
    /// order they were considered. The first one supplies the value.
    pub duplicate_columns: Vec<(Column, Vec<String>)>,
}

impl Batch {
    /// Batch from rows that were built in code.
    pub fn from_rows(rows: Vec<PartRow>) -> Self {
        Self {
            rows,
            missing_columns: Vec::new(),
            duplicate_columns: Vec::new(),
        }
    }
}

fn convert(record: RawRecord) -> PartRow {
    let mut row = PartRow::default();
    let mut filled = HashSet::new();
    for (header, cell) in record {
        let cell = cell.trim().to_string();
        let column = Column::from_header(&header);
        if let Some(column) = column {
            if !filled.insert(column) {
                continue;
            }
        }
        match column {
            Some(Column::ItemId) => row.item_id = cell,
            Some(Column::Title) => row.title = cell,
            Some(Column::PartNumber) => row.part_number = cell,
            Some(Column::Quantity) => row.quantity = cell,
            Some(Column::Process) => row.process = Process::parse(&cell),
            Some(Column::GroupLabel) => row.product_group_label = cell,
            Some(Column::Material) => row.material = cell,
            Some(Column::Dimensions) => row.dimensions = cell,
            // Output columns from an earlier run are recomputed.
            Some(Column::FinalCode | Column::ParentCode) => {}
            None => {
                row.extra.insert(header, cell);
            }
        }
    }
    row
}

/// Convert records into typed rows.
///
/// A required column absent from every record is reported once in
/// `missing_columns`; its field stays empty on every row. When several
/// headers of one record name the same column (`ITEM` and `ITEM ID`), the
/// header that sorts first is used and the clash is reported once in
/// `duplicate_columns`.
pub fn ingest(records: Vec<RawRecord>) -> Batch {
    let mut present = Vec::new();
    let mut duplicate_columns: Vec<(Column, Vec<String>)> = Vec::new();
    for record in &records {
        let mut by_column: Vec<(Column, Vec<String>)> = Vec::new();
        for header in record.keys() {
            let Some(column) = Column::from_header(header) else {
                continue;
            };
            if !present.contains(&column) {
                present.push(column);
            }
            match by_column.iter_mut().find(|(c, _)| *c == column) {
                Some((_, headers)) => headers.push(header.clone()),
                None => by_column.push((column, vec![header.clone()])),
            }
        }
        for (column, headers) in by_column {
            if headers.len() > 1 && !duplicate_columns.iter().any(|(c, _)| *c == column) {
                duplicate_columns.push((column, headers));
            }
        }
    }

    let missing_columns = if records.is_empty() {
        Vec::new()
    } else {
        Column::INPUT
            .into_iter()
            .filter(|c| c.is_required() && !present.contains(c))
            .collect()
    };

    Batch {
        rows: records.into_iter().map(convert).collect(),
        missing_columns,
        duplicate_columns,
    }
}
