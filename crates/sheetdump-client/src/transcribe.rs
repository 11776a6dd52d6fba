//! Transcription of a remote spreadsheet into an xlsx file.
//!
//! Worksheets are fetched one after the other, in document order, and the
//! workbook is only written once every fetch has succeeded.

use std::path::Path;

use sheetdump_core::{BoundingRange, WorkbookSummary, Worksheet, write_workbook};
use sheetdump_providers::{ProviderResult, SpreadsheetSource};
use tracing::{debug, info};

use crate::error::ClientResult;

/// Reads every worksheet of `spreadsheet_id` from `source`.
pub async fn collect_worksheets(
    source: &dyn SpreadsheetSource,
    spreadsheet_id: &str,
    range: BoundingRange,
) -> ProviderResult<Vec<Worksheet>> {
    let titles = source.list_worksheets(spreadsheet_id).await?;
    info!(
        "spreadsheet {} has {} worksheets (source: {})",
        spreadsheet_id,
        titles.len(),
        source.name()
    );

    let mut worksheets = Vec::with_capacity(titles.len());
    for title in titles {
        let rows = source
            .fetch_worksheet_values(spreadsheet_id, &title, range)
            .await?;
        debug!("worksheet {:?}: {} rows", title, rows.len());
        worksheets.push(Worksheet::new(title, rows));
    }
    Ok(worksheets)
}

/// Copies every worksheet of `spreadsheet_id` into a new xlsx file at `output`.
///
/// Nothing is written if any fetch fails.
pub async fn transcribe(
    source: &dyn SpreadsheetSource,
    spreadsheet_id: &str,
    range: BoundingRange,
    output: &Path,
) -> ClientResult<WorkbookSummary> {
    let worksheets = collect_worksheets(source, spreadsheet_id, range).await?;
    let summary = write_workbook(output, &worksheets)?;
    Ok(summary)
}
