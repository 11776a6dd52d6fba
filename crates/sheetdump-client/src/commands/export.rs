//! Export command: authorize, read every worksheet, write the workbook.

use sheetdump_core::WorkbookSummary;
use sheetdump_providers::google::SheetsClient;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transcribe::transcribe;

/// Runs a full export with the given configuration.
pub async fn run(config: &ClientConfig) -> ClientResult<WorkbookSummary> {
    config.validate().map_err(ClientError::Config)?;
    let range = config.bounding_range().map_err(ClientError::Config)?;

    let manager = super::credential_manager(config)?;
    let credential = manager.authorize().await?;

    let client = SheetsClient::new(&credential, manager.config());
    info!(
        "exporting spreadsheet {} to {}",
        config.spreadsheet_id,
        config.output.display()
    );
    transcribe(&client, &config.spreadsheet_id, range, &config.output).await
}
