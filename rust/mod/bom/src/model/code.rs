//! Code shapes.
//!
//! - Manufactured: `NN-NNNN-NNNN-<anything>`
//! - Commercial:   `GGG-<width digits>` where `GGG` is the product group
//! - Unresolved:   the literal `NULO`
//!
//! Digit classes are ASCII-only; Unicode digits never form a code.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ConfigError, MAX_WIDTH};

/// Sentinel for a row whose code could not be determined.
pub const NULO: &str = "NULO";

static MANUFACTURED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}-[0-9]{4}-[0-9]{4}-").unwrap());

static GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{3}").unwrap());

/// True when `part_number` has the manufactured-code shape.
pub fn is_manufactured(part_number: &str) -> bool {
    MANUFACTURED.is_match(part_number)
}

/// First run of three ASCII digits in a product group label.
///
/// `"100 - FIXINGS"` → `Some("100")`, `"ABC1234"` → `Some("123")`.
pub fn extract_group(label: &str) -> Option<&str> {
    GROUP.find(label).map(|m| m.as_str())
}

/// True when `group` is exactly three ASCII digits.
pub fn is_group_code(group: &str) -> bool {
    group.len() == 3 && group.bytes().all(|b| b.is_ascii_digit())
}

/// Commercial code format for one deployment's width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFormat {
    width: usize,
}

impl CodeFormat {
    pub fn new(width: usize) -> Result<Self, ConfigError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(ConfigError::WidthOutOfRange(width));
        }
        Ok(Self { width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Largest sequence representable at this width (`9999` for width 4).
    pub fn max_sequence(&self) -> u64 {
        10u64.pow(self.width as u32) - 1
    }

    /// Format `group` and `sequence` as a commercial code, zero-padded.
    pub fn format(&self, group: &str, sequence: u64) -> String {
        format!("{}-{:0width$}", group, sequence, width = self.width)
    }

    /// Split a commercial code into `(group, sequence)`.
    ///
    /// Returns `None` unless the code is exactly three digits, a hyphen and
    /// `width` digits. A code minted at another width is not recognised.
    pub fn parse<'a>(&self, code: &'a str) -> Option<(&'a str, u64)> {
        let (group, seq) = code.split_once('-')?;
        if !is_group_code(group) {
            return None;
        }
        if seq.len() != self.width || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let sequence = seq.parse().ok()?;
        Some((group, sequence))
    }

    pub fn is_commercial(&self, code: &str) -> bool {
        self.parse(code).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufactured_shape() {
        assert!(is_manufactured("12-3456-7890-A"));
        assert!(is_manufactured("12-3456-7890-"));
        assert!(is_manufactured("00-0000-0000-REV.B"));
        assert!(!is_manufactured("12-3456-7890"));
        assert!(!is_manufactured("123-3456-7890-A"));
        assert!(!is_manufactured("1-3456-7890-A"));
        assert!(!is_manufactured(" 12-3456-7890-A"));
        assert!(!is_manufactured("100-0001"));
        assert!(!is_manufactured("١٢-3456-7890-A"));
    }

    #[test]
    fn group_extraction() {
        assert_eq!(extract_group("100 - PARAFUSOS"), Some("100"));
        assert_eq!(extract_group("GRUPO 205"), Some("205"));
        assert_eq!(extract_group("ABC1234"), Some("123"));
        assert_eq!(extract_group("12 A 34"), None);
        assert_eq!(extract_group(""), None);
    }

    #[test]
    fn commercial_shape_width_4() {
        let f = CodeFormat::new(4).unwrap();
        assert_eq!(f.parse("100-0001"), Some(("100", 1)));
        assert_eq!(f.parse("999-9999"), Some(("999", 9999)));
        assert_eq!(f.parse("100-00001"), None);
        assert_eq!(f.parse("100-001"), None);
        assert_eq!(f.parse("10-0001"), None);
        assert_eq!(f.parse("100-000A"), None);
        assert_eq!(f.parse("100-0001 "), None);
        assert_eq!(f.parse("NULO"), None);
        assert_eq!(f.parse("12-3456-7890-A"), None);
    }

    #[test]
    fn commercial_shape_width_6() {
        let f = CodeFormat::new(6).unwrap();
        assert!(f.is_commercial("900-999999"));
        assert!(!f.is_commercial("900-9999"));
        assert_eq!(f.max_sequence(), 999_999);
        assert_eq!(f.format("900", 42), "900-000042");
    }

    #[test]
    fn format_pads_to_width() {
        let f = CodeFormat::new(4).unwrap();
        assert_eq!(f.format("100", 1), "100-0001");
        assert_eq!(f.format("100", 9999), "100-9999");
        assert_eq!(f.max_sequence(), 9999);
    }

    #[test]
    fn rejects_bad_width() {
        assert!(CodeFormat::new(0).is_err());
        assert!(CodeFormat::new(MAX_WIDTH + 1).is_err());
    }
}
