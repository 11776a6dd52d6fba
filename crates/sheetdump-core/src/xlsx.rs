//! xlsx output.
//!
//! [`write_workbook`] turns a list of [`Worksheet`]s into a single `.xlsx`
//! file: one sheet per worksheet, in order, every non-empty value written as
//! a string at its original coordinate.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::{debug, info, warn};

use crate::error::{OutputError, OutputResult};
use crate::range::{MAX_COLUMNS, MAX_ROWS, column_name};
use crate::sheet_name::SheetNamer;
use crate::worksheet::Worksheet;

/// Longest string an xlsx cell can hold, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// What was written by [`write_workbook`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookSummary {
    /// Output sheet names, in order.
    pub sheet_names: Vec<String>,
    /// Total number of cells written.
    pub cells: usize,
    /// Size of the file on disk, in bytes.
    pub bytes: usize,
    /// Number of cells cut down to [`MAX_CELL_CHARS`].
    pub truncated: usize,
}

/// Writes `worksheets` to a new xlsx file at `path`, replacing any existing
/// file.
///
/// The workbook is serialized in memory first and then written and synced in
/// one go, so a failure while building it leaves the previous file intact.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if the file cannot be created, written or
/// synced, and [`OutputError::CellOutOfRange`] / [`OutputError::Workbook`] if
/// the data cannot be represented in xlsx.
pub fn write_workbook(path: &Path, worksheets: &[Worksheet]) -> OutputResult<WorkbookSummary> {
    let mut workbook = Workbook::new();
    let mut namer = SheetNamer::new();
    let mut summary = WorkbookSummary::default();

    for sheet in worksheets {
        let name = namer.assign(&sheet.title);
        if name != sheet.title {
            warn!(
                "worksheet title {:?} is not a valid xlsx sheet name, writing it as {:?}",
                sheet.title, name
            );
        }

        let output = workbook.add_worksheet();
        output.set_name(&name)?;

        let mut written = 0;
        for (row, col, value) in sheet.cells() {
            let (r, c) = match (u32::try_from(row), u16::try_from(col)) {
                (Ok(r), Ok(c)) if r < MAX_ROWS && c < MAX_COLUMNS => (r, c),
                _ => {
                    return Err(OutputError::CellOutOfRange {
                        sheet: name,
                        row,
                        col,
                    });
                }
            };
            match truncate_cell(value) {
                Some(cut) => {
                    warn!(
                        "cell {}{} of sheet {:?} has {} characters, keeping the first {}",
                        column_name(c + 1),
                        r + 1,
                        name,
                        value.chars().count(),
                        MAX_CELL_CHARS
                    );
                    output.write_string(r, c, cut)?;
                    summary.truncated += 1;
                }
                None => {
                    output.write_string(r, c, value)?;
                }
            }
            written += 1;
        }

        debug!("sheet {:?}: {} cells", name, written);
        summary.cells += written;
        summary.sheet_names.push(name);
    }

    let buffer = workbook.save_to_buffer()?;
    summary.bytes = buffer.len();

    let mut file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    file.write_all(&buffer).map_err(|e| OutputError::io(path, e))?;
    file.sync_all().map_err(|e| OutputError::io(path, e))?;

    info!(
        "wrote {} sheets ({} cells) to {}",
        summary.sheet_names.len(),
        summary.cells,
        path.display()
    );
    Ok(summary)
}

/// Returns the prefix of `value` that fits in a cell, if it needs cutting.
fn truncate_cell(value: &str) -> Option<&str> {
    value
        .char_indices()
        .nth(MAX_CELL_CHARS)
        .map(|(end, _)| &value[..end])
}
