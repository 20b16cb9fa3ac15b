use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Process category of a BOM line.
///
/// Labels parse case-insensitively from English or Portuguese. Any other
/// non-blank label is kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Process {
    Manufactured,
    Assembly,
    Welding,
    Commercial,
    Other(String),
}

impl Process {
    /// Parse a process label. Blank labels yield `None`.
    pub fn parse(label: &str) -> Option<Process> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let process = match label.to_uppercase().as_str() {
            "MANUFACTURED" | "FABRICADO" => Process::Manufactured,
            "ASSEMBLY" | "MONTAGEM" => Process::Assembly,
            "WELDING" | "SOLDA" => Process::Welding,
            "COMMERCIAL" | "COMERCIAL" => Process::Commercial,
            _ => Process::Other(label.to_string()),
        };
        Some(process)
    }

    pub fn label(&self) -> &str {
        match self {
            Process::Manufactured => "MANUFACTURED",
            Process::Assembly => "ASSEMBLY",
            Process::Welding => "WELDING",
            Process::Commercial => "COMMERCIAL",
            Process::Other(label) => label,
        }
    }

    /// Manufactured, assembly and welding rows carry in-house part numbers.
    pub fn is_in_house(&self) -> bool {
        matches!(
            self,
            Process::Manufactured | Process::Assembly | Process::Welding
        )
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Process {
    fn from(label: String) -> Self {
        Process::parse(&label).unwrap_or(Process::Other(label))
    }
}

impl From<Process> for String {
    fn from(process: Process) -> Self {
        process.label().to_string()
    }
}

/// How a row's final code came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowStatus {
    /// In-house part number used as-is.
    PassThrough,
    /// Part number already was a valid commercial code.
    Reused,
    /// A new commercial code was minted.
    Assigned,
    /// Unresolved row that adopted a descendant's code.
    Inherited,
    /// Final code is `NULO`.
    Unresolved,
}

/// One BOM line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRow {
    /// Dotted hierarchical position, e.g. "1.2.3".
    pub item_id: String,

    pub part_number: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub quantity: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,

    /// Free text scanned for a three-digit product group.
    #[serde(default)]
    pub product_group_label: String,

    #[serde(default)]
    pub material: String,

    #[serde(default)]
    pub dimensions: String,

    #[serde(default)]
    pub final_code: String,

    #[serde(default)]
    pub parent_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RowStatus>,

    /// Columns the engine does not know, carried through to output.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl PartRow {
    pub fn new(item_id: impl Into<String>, part_number: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            part_number: part_number.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_group(mut self, label: impl Into<String>) -> Self {
        self.product_group_label = label.into();
        self
    }

    pub fn with_process(mut self, process: Process) -> Self {
        self.process = Some(process);
        self
    }

    pub fn process_label(&self) -> &str {
        self.process.as_ref().map(Process::label).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_labels() {
        assert_eq!(Process::parse("fabricado"), Some(Process::Manufactured));
        assert_eq!(Process::parse(" COMERCIAL "), Some(Process::Commercial));
        assert_eq!(Process::parse("Montagem"), Some(Process::Assembly));
        assert_eq!(Process::parse("SOLDA"), Some(Process::Welding));
        assert_eq!(Process::parse("commercial"), Some(Process::Commercial));
        assert_eq!(Process::parse("   "), None);
        assert_eq!(
            Process::parse("Pintura"),
            Some(Process::Other("Pintura".into()))
        );
    }

    #[test]
    fn process_serializes_as_label() {
        let json = serde_json::to_string(&Process::Assembly).unwrap();
        assert_eq!(json, r#""ASSEMBLY""#);
        let back: Process = serde_json::from_str(r#""solda""#).unwrap();
        assert_eq!(back, Process::Welding);
    }

    #[test]
    fn row_json_uses_camel_case() {
        let mut row = PartRow::new("1.2", "12-3456-7890-A")
            .with_title("Bracket")
            .with_process(Process::Manufactured);
        row.final_code = "12-3456-7890-A".into();
        row.status = Some(RowStatus::PassThrough);

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["itemId"], "1.2");
        assert_eq!(value["finalCode"], "12-3456-7890-A");
        assert_eq!(value["process"], "MANUFACTURED");
        assert_eq!(value["status"], "passThrough");
        assert!(value.get("extra").is_none());

        let back: PartRow = serde_json::from_value(value).unwrap();
        assert_eq!(back, row);
    }
}
