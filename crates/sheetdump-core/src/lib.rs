//! Core types: worksheets, bounding ranges, sheet naming, xlsx output, tracing

pub mod error;
pub mod range;
pub mod sheet_name;
pub mod tracing;
pub mod worksheet;
pub mod xlsx;

pub use error::{OutputError, OutputResult};
pub use range::{BoundingRange, RangeError};
pub use sheet_name::SheetNamer;
pub use tracing::{TracingConfig, TracingError, init_tracing};
pub use worksheet::Worksheet;
pub use xlsx::{WorkbookSummary, write_workbook};
