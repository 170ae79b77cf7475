//! Implements the `Sheet` trait against the Google Sheets API.
//!
//! Reads go through the `sheets::Client`. Writes are sent with `reqwest` directly so that each
//! cell keeps its JSON type (`sheets` models every value as a string) and so that they can use the
//! `RAW` input option, which stores `001` as text instead of the number `1`.

use crate::api::{Cell, Sheet, TokenProvider};
use crate::error::Res;
use crate::model::{row_range, whole_tab};
use anyhow::{anyhow, bail, Context};
use sheets::types::{DateTimeRenderOption, Dimension, ValueRenderOption};
use tracing::trace;
use url::Url;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub(super) struct GoogleSheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
    http: reqwest::Client,
}

impl GoogleSheet {
    pub(super) fn new(spreadsheet_id: impl Into<String>, token_provider: TokenProvider) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            token_provider,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a sheets client with a current access token.
    async fn client(&self) -> Res<sheets::Client> {
        let access_token = self.token_provider.token().await?;
        // The sheets crate wants OAuth client details, but they are only used for refreshing,
        // which the token provider already handles.
        Ok(sheets::Client::new(
            String::new(),
            String::new(),
            String::new(),
            access_token,
            String::new(),
        ))
    }

    /// Builds `.../spreadsheets/{id}/values/{range}{suffix}?valueInputOption=RAW`.
    fn values_url(&self, range: &str, suffix: &str) -> Res<Url> {
        let mut url = Url::parse(SHEETS_API).context("Invalid Sheets API base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("The Sheets API base URL cannot have path segments"))?
            .extend([
                self.spreadsheet_id.as_str(),
                "values",
                format!("{range}{suffix}").as_str(),
            ]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, tab: &str) -> Res<Vec<Vec<String>>> {
        trace!("get for {tab}");
        let range = whole_tab(tab);
        let response = self
            .client()
            .await?
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                &range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch the '{tab}' tab"))?;
        Ok(response.body.values)
    }

    async fn append_row(&mut self, tab: &str, cells: &[Cell]) -> Res<()> {
        trace!("append_row to {tab}: {cells:?}");
        let mut url = self.values_url(&whole_tab(tab), ":append")?;
        url.query_pairs_mut()
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = self.token_provider.token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "majorDimension": "ROWS",
                "values": [cells],
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send the append request for the '{tab}' tab"))?;
        check_status(response)
            .await
            .with_context(|| format!("Failed to append a row to the '{tab}' tab"))
    }

    async fn write_row(&mut self, tab: &str, row: usize, cells: &[Cell]) -> Res<()> {
        let range = row_range(tab, row, cells.len());
        trace!("write_row to {range}: {cells:?}");
        let url = self.values_url(&range, "")?;
        let token = self.token_provider.token().await?;
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&serde_json::json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [cells],
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send the update request for {range}"))?;
        check_status(response)
            .await
            .with_context(|| format!("Failed to write {range}"))
    }
}

/// Turns a non-success HTTP response into an error carrying the response body.
async fn check_status(response: reqwest::Response) -> Res<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("Google Sheets API responded with status {status}: {body}")
}

fn map_client_error(e: sheets::ClientError) -> anyhow::Error {
    anyhow::Error::new(e).context("Google Sheets client error")
}
