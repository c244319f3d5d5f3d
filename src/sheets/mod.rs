//! Spreadsheet response source.
//!
//! Reads a cell range through the Google Sheets v4 `values.get` endpoint with a
//! bearer token. Token acquisition and refresh are not handled here.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::agent::ResponseSource;
use crate::aggregate::ResponseTable;
use crate::config::{RequestConfig, SheetsConfig};
use crate::error::{ServiceResult, SheetsError, SheetsResult};

/// Body of a `values.get` response
#[derive(Debug, Clone, Deserialize)]
pub struct ValueRange {
    pub range: Option<String>,
    #[serde(rename = "majorDimension")]
    pub major_dimension: Option<String>,
    /// Absent when the range holds no data.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Convert the cells to strings.
    ///
    /// Sheets returns formatted strings by default; numbers and booleans are
    /// rendered with their JSON text and nulls become empty cells.
    pub fn into_table(self) -> ResponseTable {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Client for one spreadsheet range
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    spreadsheet_id: Option<String>,
    range: String,
    timeout_ms: u64,
}

impl SheetsClient {
    /// Create a new Sheets client
    pub fn new(config: &SheetsConfig, request_config: &RequestConfig) -> SheetsResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(SheetsError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            timeout_ms: request_config.timeout_ms,
        })
    }

    /// Fetch the configured range as a table of strings
    pub async fn fetch_values(&self) -> SheetsResult<ResponseTable> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| missing("SHEETS_ACCESS_TOKEN"))?;
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| missing("SHEETS_SPREADSHEET_ID"))?;
        let url = self.values_url(spreadsheet_id)?;

        debug!(url = %url, "Fetching spreadsheet values");
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SheetsError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    SheetsError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), range = %self.range, "Sheets request failed");
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let value_range: ValueRange =
            response
                .json()
                .await
                .map_err(|e| SheetsError::InvalidResponse {
                    message: format!("Failed to parse values response: {}", e),
                })?;

        let table = value_range.into_table();
        info!(
            range = %self.range,
            rows = table.len(),
            latency_ms = start.elapsed().as_millis(),
            "Spreadsheet values fetched"
        );

        Ok(table)
    }

    fn values_url(&self, spreadsheet_id: &str) -> SheetsResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| SheetsError::InvalidUrl {
            message: format!("{}: {}", self.base_url, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", self.range.as_str()]);
        Ok(url)
    }
}

fn missing(name: &str) -> SheetsError {
    SheetsError::MissingSetting {
        name: name.to_string(),
    }
}

#[async_trait]
impl ResponseSource for SheetsClient {
    async fn fetch_rows(&self) -> ServiceResult<ResponseTable> {
        Ok(self.fetch_values().await?)
    }
}
