//! Fixed bounding range requested for every worksheet.
//!
//! The range is always anchored at `A1` so that a value at index `(i, j)` in
//! the fetched rows sits at row `i`, column `j` of the source sheet.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Largest column count an xlsx sheet can hold (`XFD`).
pub const MAX_COLUMNS: u16 = 16_384;

/// Largest row count an xlsx sheet can hold.
pub const MAX_ROWS: u32 = 1_048_576;

/// Errors produced when parsing a bounding range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The range does not have the `A1:<cell>` shape.
    #[error("range must look like A1:Z1000, got {0:?}")]
    Malformed(String),

    /// The range starts somewhere other than `A1`.
    #[error("range must start at A1, got {0:?}")]
    NotAnchored(String),

    /// The range exceeds the sheet size limits.
    #[error("range {0:?} exceeds the maximum sheet size (XFD1048576)")]
    TooLarge(String),
}

/// A fixed maximum extent, in columns and rows, starting at `A1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRange {
    columns: u16,
    rows: u32,
}

impl BoundingRange {
    /// Creates a range covering `columns` x `rows` cells from `A1`.
    pub fn new(columns: u16, rows: u32) -> Result<Self, RangeError> {
        if columns == 0 || rows == 0 {
            return Err(RangeError::Malformed(format!("{columns}x{rows}")));
        }
        if columns > MAX_COLUMNS || rows > MAX_ROWS {
            return Err(RangeError::TooLarge(format!("{columns}x{rows}")));
        }
        Ok(Self { columns, rows })
    }

    /// Number of columns covered.
    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// Number of rows covered.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the A1 notation for this range on the given worksheet,
    /// e.g. `'My Sheet'!A1:Z1000`.
    ///
    /// The title is always quoted, with embedded apostrophes doubled.
    pub fn a1_for(&self, title: &str) -> String {
        format!("'{}'!{}", title.replace('\'', "''"), self)
    }
}

impl Default for BoundingRange {
    fn default() -> Self {
        Self {
            columns: 26,
            rows: 1000,
        }
    }
}

impl fmt::Display for BoundingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A1:{}{}", column_name(self.columns), self.rows)
    }
}

impl FromStr for BoundingRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (start, end) = trimmed
            .split_once(':')
            .ok_or_else(|| RangeError::Malformed(s.to_string()))?;

        if !start.eq_ignore_ascii_case("A1") {
            return Err(RangeError::NotAnchored(s.to_string()));
        }

        let split = end
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| RangeError::Malformed(s.to_string()))?;
        let (letters, digits) = end.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RangeError::Malformed(s.to_string()));
        }

        let columns = column_number(letters).ok_or_else(|| RangeError::TooLarge(s.to_string()))?;
        let rows: u32 = digits
            .parse()
            .map_err(|_| RangeError::Malformed(s.to_string()))?;

        Self::new(columns, rows).map_err(|e| match e {
            RangeError::TooLarge(_) => RangeError::TooLarge(s.to_string()),
            _ => RangeError::Malformed(s.to_string()),
        })
    }
}

/// Converts a 1-based column number to its letters (`1` → `A`, `27` → `AA`).
pub fn column_name(mut column: u16) -> String {
    let mut name = Vec::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.push(b'A' + rem);
        column = (column - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Converts column letters to a 1-based number, or `None` past `XFD`.
pub fn column_number(letters: &str) -> Option<u16> {
    let mut number: u32 = 0;
    for c in letters.chars() {
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        number = number * 26 + digit;
        if number > MAX_COLUMNS as u32 {
            return None;
        }
    }
    u16::try_from(number).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_a1_z1000() {
        let range = BoundingRange::default();
        assert_eq!(range.columns(), 26);
        assert_eq!(range.rows(), 1000);
        assert_eq!(range.to_string(), "A1:Z1000");
    }

    #[test]
    fn parse_valid_ranges() {
        assert_eq!("A1:Z1000".parse::<BoundingRange>().unwrap(), BoundingRange::default());
        let wide: BoundingRange = "a1:ab20".parse().unwrap();
        assert_eq!(wide.columns(), 28);
        assert_eq!(wide.rows(), 20);
        assert_eq!(wide.to_string(), "A1:AB20");
    }

    #[test]
    fn parse_rejects_bad_ranges() {
        assert!(matches!("Z1000".parse::<BoundingRange>(), Err(RangeError::Malformed(_))));
        assert!(matches!("B2:Z1000".parse::<BoundingRange>(), Err(RangeError::NotAnchored(_))));
        assert!(matches!("A1:1000".parse::<BoundingRange>(), Err(RangeError::Malformed(_))));
        assert!(matches!("A1:Z".parse::<BoundingRange>(), Err(RangeError::Malformed(_))));
        assert!(matches!("A1:Z0".parse::<BoundingRange>(), Err(RangeError::Malformed(_))));
        assert!(matches!("A1:XFE10".parse::<BoundingRange>(), Err(RangeError::TooLarge(_))));
        assert!(matches!(
            "A1:A1048577".parse::<BoundingRange>(),
            Err(RangeError::TooLarge(_))
        ));
    }

    #[test]
    fn column_names() {
        assert_eq!(column_name(1), "A");
        assert_eq!(column_name(26), "Z");
        assert_eq!(column_name(27), "AA");
        assert_eq!(column_name(MAX_COLUMNS), "XFD");
        assert_eq!(column_number("XFD"), Some(MAX_COLUMNS));
        assert_eq!(column_number("aa"), Some(27));
    }

    #[test]
    fn a1_quotes_titles() {
        let range = BoundingRange::default();
        assert_eq!(range.a1_for("Sheet1"), "'Sheet1'!A1:Z1000");
        assert_eq!(range.a1_for("Bob's list"), "'Bob''s list'!A1:Z1000");
    }
}
