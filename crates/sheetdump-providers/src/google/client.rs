//! Google Sheets API client.
//!
//! This module provides the HTTP client for the Sheets API v4 and implements
//! [`SpreadsheetSource`] on top of it.

use reqwest::StatusCode;
use serde::Deserialize;
use sheetdump_core::BoundingRange;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::source::{BoxFuture, SpreadsheetSource};

use super::config::GoogleConfig;
use super::credential::Credential;

/// Field mask for the metadata request: only the worksheet titles.
const SHEET_TITLES_FIELDS: &str = "sheets.properties.title";

/// Google Sheets API client.
#[derive(Debug)]
pub struct SheetsClient {
    http_client: reqwest::Client,
    access_token: String,
    api_base: String,
}

impl SheetsClient {
    /// Creates a client authorized by `credential`.
    pub fn new(credential: &Credential, config: &GoogleConfig) -> Self {
        Self::with_token(&credential.access_token, config)
    }

    fn with_token(access_token: &str, config: &GoogleConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            access_token: access_token.to_string(),
            api_base: config.api_base.clone(),
        }
    }

    /// Lists worksheet titles in document order.
    pub async fn sheet_titles(&self, spreadsheet_id: &str) -> ProviderResult<Vec<String>> {
        let url = format!(
            "{}/spreadsheets/{}",
            self.api_base,
            urlencoding::encode(spreadsheet_id)
        );
        let body = self
            .get(&url, &[("fields", SHEET_TITLES_FIELDS)], spreadsheet_id)
            .await?;

        let metadata: SpreadsheetResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse spreadsheet metadata: {}", e))
                .with_provider("google")
        })?;

        let titles: Vec<String> = metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect();
        debug!("spreadsheet {} has {} worksheets", spreadsheet_id, titles.len());
        Ok(titles)
    }

    /// Reads the values of `title` within `range`.
    pub async fn values(
        &self,
        spreadsheet_id: &str,
        title: &str,
        range: BoundingRange,
    ) -> ProviderResult<Vec<Vec<String>>> {
        let a1 = range.a1_for(title);
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.api_base,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(&a1)
        );
        let body = self.get(&url, &[], spreadsheet_id).await?;

        let value_range: ValueRange = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse values of {}: {}", a1, e))
                .with_provider("google")
        })?;

        let rows = value_range.into_rows();
        debug!("read {} rows from {}", rows.len(), a1);
        Ok(rows)
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        spreadsheet_id: &str,
    ) -> ProviderResult<String> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                ProviderError::network(message)
                    .with_provider("google")
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e))
                .with_provider("google")
        })?;

        if status.is_success() {
            return Ok(body);
        }

        let detail = api_error_message(&body);
        let err = match status {
            // Only the token endpoint reports authentication failures
            StatusCode::UNAUTHORIZED => {
                ProviderError::authorization(format!("access token rejected: {}", detail))
            }
            StatusCode::FORBIDDEN => ProviderError::authorization(format!(
                "access denied to spreadsheet {}: {}",
                spreadsheet_id, detail
            )),
            StatusCode::NOT_FOUND => ProviderError::not_found(format!(
                "spreadsheet {} not found: {}",
                spreadsheet_id, detail
            )),
            StatusCode::BAD_REQUEST => ProviderError::bad_request(detail),
            _ => ProviderError::server(format!("API error ({}): {}", status, detail)),
        };
        Err(err.with_provider("google"))
    }
}

impl SpreadsheetSource for SheetsClient {
    fn name(&self) -> &str {
        "google"
    }

    fn list_worksheets<'a>(
        &'a self,
        spreadsheet_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<String>>> {
        Box::pin(self.sheet_titles(spreadsheet_id))
    }

    fn fetch_worksheet_values<'a>(
        &'a self,
        spreadsheet_id: &'a str,
        title: &'a str,
        range: BoundingRange,
    ) -> BoxFuture<'a, ProviderResult<Vec<Vec<String>>>> {
        Box::pin(self.values(spreadsheet_id, title, range))
    }
}

/// Pulls the human-readable message out of a Google API error body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// A `ValueRange` resource. `values` is absent for an empty range.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

/// Formatted values arrive as strings; anything else is kept as its JSON text.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
