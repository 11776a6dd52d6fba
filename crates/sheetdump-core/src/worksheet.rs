//! Worksheet data as fetched from the remote spreadsheet.

/// One named tab of a spreadsheet with its cell values.
///
/// Rows are ragged: the remote API omits trailing empty cells and rows, so
/// two rows of the same worksheet can have different lengths. Positions are
/// zero-based and map 1:1 onto the output sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worksheet {
    /// The worksheet title as reported by the source.
    pub title: String,
    /// Cell values, row-major.
    pub rows: Vec<Vec<String>>,
}

impl Worksheet {
    /// Creates a worksheet with the given title and rows.
    pub fn new(title: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    /// Creates a worksheet with no cells.
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    /// Returns the value at `(row, col)`, if the source provided one.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }

    /// Iterates over every non-empty cell as `(row, col, value)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .map(move |(j, value)| (i, j, value.as_str()))
        })
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    /// True when the worksheet has no non-empty cells.
    pub fn is_blank(&self) -> bool {
        self.cell_count() == 0
    }
}
