//! SpreadsheetSource trait definition.
//!
//! A [`SpreadsheetSource`] is the read side of the transcription: it lists
//! the worksheets of a spreadsheet and returns the values of one worksheet
//! at a time. The Google Sheets client implements it for real runs and
//! [`MemorySource`] implements it for tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use sheetdump_core::{BoundingRange, Worksheet};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to a remote spreadsheet.
///
/// # Implementation Notes
///
/// - Worksheet titles are returned in document order.
/// - Values are returned row-major, anchored at `A1`, limited to the given
///   range. Trailing empty cells and rows may be omitted, so rows are ragged.
/// - Values are returned verbatim as strings; no typing or trimming happens.
pub trait SpreadsheetSource: Send + Sync {
    /// Returns the name of this source (e.g., "google").
    fn name(&self) -> &str;

    /// Lists the worksheet titles of the spreadsheet, in document order.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the session is not authorized or the
    /// spreadsheet does not exist.
    fn list_worksheets<'a>(
        &'a self,
        spreadsheet_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<String>>>;

    /// Fetches the values of one worksheet within `range`.
    fn fetch_worksheet_values<'a>(
        &'a self,
        spreadsheet_id: &'a str,
        title: &'a str,
        range: BoundingRange,
    ) -> BoxFuture<'a, ProviderResult<Vec<Vec<String>>>>;
}

/// An in-memory spreadsheet.
///
/// Behaves like the remote API: unknown spreadsheet ids are not found,
/// values are clipped to the requested range and trailing empty cells and
/// rows are dropped.
#[derive(Debug)]
pub struct MemorySource {
    spreadsheet_id: String,
    worksheets: Vec<Worksheet>,
    requests: Mutex<Vec<String>>,
}

impl MemorySource {
    /// Creates a source serving `worksheets` under `spreadsheet_id`.
    pub fn new(spreadsheet_id: impl Into<String>, worksheets: Vec<Worksheet>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            worksheets,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the worksheet titles requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn check_id(&self, spreadsheet_id: &str) -> ProviderResult<()> {
        if spreadsheet_id == self.spreadsheet_id {
            Ok(())
        } else {
            Err(ProviderError::not_found(format!(
                "spreadsheet {} not found",
                spreadsheet_id
            ))
            .with_provider("memory"))
        }
    }
}

impl SpreadsheetSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_worksheets<'a>(
        &'a self,
        spreadsheet_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<String>>> {
        Box::pin(async move {
            self.check_id(spreadsheet_id)?;
            Ok(self.worksheets.iter().map(|w| w.title.clone()).collect())
        })
    }

    fn fetch_worksheet_values<'a>(
        &'a self,
        spreadsheet_id: &'a str,
        title: &'a str,
        range: BoundingRange,
    ) -> BoxFuture<'a, ProviderResult<Vec<Vec<String>>>> {
        Box::pin(async move {
            self.check_id(spreadsheet_id)?;
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(title.to_string());
            }

            let sheet = self
                .worksheets
                .iter()
                .find(|w| w.title == title)
                .ok_or_else(|| {
                    ProviderError::bad_request(format!("unable to parse range: {}", range.a1_for(title)))
                        .with_provider("memory")
                })?;

            Ok(clip(&sheet.rows, range))
        })
    }
}

/// Clips rows to `range` and drops trailing empty cells and rows.
fn clip(rows: &[Vec<String>], range: BoundingRange) -> Vec<Vec<String>> {
    let mut clipped: Vec<Vec<String>> = rows
        .iter()
        .take(range.rows() as usize)
        .map(|row| {
            let mut row: Vec<String> = row.iter().take(range.columns() as usize).cloned().collect();
            while row.last().is_some_and(|v| v.is_empty()) {
                row.pop();
            }
            row
        })
        .collect();

    while clipped.last().is_some_and(|r| r.is_empty()) {
        clipped.pop();
    }
    clipped
}
