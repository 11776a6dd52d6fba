//! Errors raised while producing the output workbook.

use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// An error that occurred while writing the output workbook.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output file could not be created, written or flushed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The output path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A cell lies outside the area an xlsx sheet can address.
    #[error("cell ({row}, {col}) of sheet {sheet:?} is outside the xlsx grid")]
    CellOutOfRange {
        /// The output sheet name.
        sheet: String,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
    },

    /// The xlsx writer rejected the workbook contents.
    #[error("failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
}

impl OutputError {
    /// Creates an IO error for the given output path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True if this error comes from the filesystem rather than the data.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// A specialized Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;
