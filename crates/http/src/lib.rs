//! # gsheet-http
//!
//! Sheets API v4 transport.
//!
//! [`HttpTransport`] implements [`SheetsTransport`] over reqwest with a bearer
//! token taken from an injected [`CredentialProvider`]. It never retries:
//! rejected credentials surface as `AuthRequired`, missing sheets as
//! `NotFound`, and everything else as `Transport`.

mod credentials;

pub use credentials::{CredentialProvider, EnvToken, StaticToken};

use async_trait::async_trait;
use gsheet_core::{
    BatchReply, BatchRequest, SheetProperties, SheetsTransport, StoreConfig, StoreError,
    StoreResult,
};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;

/// Sheets API client bound to one spreadsheet.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    credentials: Arc<dyn CredentialProvider>,
}

#[derive(Deserialize)]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

#[derive(Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<JsonValue>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl HttpTransport {
    /// Constructs a transport for the spreadsheet named in `config`.
    ///
    /// The underlying client uses the configured timeout and bypasses system
    /// proxy lookup.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &StoreConfig, credentials: Arc<dyn CredentialProvider>) -> StoreResult<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| StoreError::Config(format!("invalid api_base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "api_base_url cannot be used as a base: {}",
                config.api_base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            // Disable system proxy lookup to avoid macOS system-configuration issues
            .no_proxy()
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
            credentials,
        })
    }

    /// Ask the credential provider for a fresh token. Returns whether one is
    /// now available.
    pub async fn reauthenticate(&self) -> StoreResult<bool> {
        Ok(self.credentials.refresh().await?.is_some())
    }

    /// `{base}/v4/spreadsheets/{id}` followed by `tail`, each segment
    /// percent-encoded.
    fn url(&self, id_suffix: &str, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            // `cannot_be_a_base` was rejected in `new`.
            let mut segments = url
                .path_segments_mut()
                .unwrap_or_else(|()| unreachable!("base URL checked in constructor"));
            segments.pop_if_empty();
            segments.extend(["v4", "spreadsheets"]);
            segments.push(&format!("{}{}", self.spreadsheet_id, id_suffix));
            segments.extend(tail);
        }
        url
    }

    fn values_url(&self, range: &str, suffix: &str) -> Url {
        self.url("", &["values", &format!("{range}{suffix}")])
    }

    /// Attach the bearer token and send, mapping failures onto the error
    /// taxonomy.
    async fn send(&self, request: RequestBuilder, what: &str) -> StoreResult<Response> {
        let Some(token) = self.credentials.access_token().await? else {
            return Err(StoreError::AuthRequired);
        };

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::transport(format!("{what}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());

        match status.as_u16() {
            401 | 403 => {
                tracing::warn!(status = status.as_u16(), "{what}: credential rejected");
                self.credentials.revoke().await;
                Err(StoreError::AuthRequired)
            }
            404 => Err(StoreError::not_found(format!("{what}: {message}"))),
            400 if is_missing_target(&message) => {
                Err(StoreError::not_found(format!("{what}: {message}")))
            }
            code => Err(StoreError::transport(format!("HTTP {code} - {message}"))),
        }
    }

    async fn write_values(
        &self,
        request: RequestBuilder,
        range: &str,
        rows: Vec<Vec<String>>,
        what: &str,
    ) -> StoreResult<()> {
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        self.send(request.json(&body), what).await?;
        Ok(())
    }
}

/// The API reports unknown sheet names and tab ids as bad requests.
fn is_missing_target(message: &str) -> bool {
    message.contains("Unable to parse range") || message.contains("No grid with id")
}

/// Render a cell as the string the spreadsheet displays.
fn cell_to_string(value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => (if b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}

fn batch_request_json(request: &BatchRequest) -> JsonValue {
    match request {
        BatchRequest::AddSheet { title } => json!({
            "addSheet": { "properties": { "title": title } }
        }),
        BatchRequest::DeleteSheet { sheet_id } => json!({
            "deleteSheet": { "sheetId": sheet_id }
        }),
    }
}

fn batch_reply(reply: JsonValue) -> StoreResult<BatchReply> {
    match reply.get("addSheet").and_then(|r| r.get("properties")) {
        Some(properties) => Ok(BatchReply::AddSheet(serde_json::from_value(
            properties.clone(),
        )?)),
        None => Ok(BatchReply::Empty),
    }
}

#[async_trait]
impl SheetsTransport for HttpTransport {
    async fn spreadsheet_metadata(&self) -> StoreResult<Vec<SheetProperties>> {
        let mut url = self.url("", &[]);
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        tracing::debug!("fetching spreadsheet metadata");

        let response = self.send(self.client.get(url), "metadata").await?;
        let body: SpreadsheetResponse = response
            .json()
            .await
            .map_err(|e| StoreError::transport(format!("Failed to parse metadata: {e}")))?;
        Ok(body.sheets.into_iter().map(|s| s.properties).collect())
    }

    async fn get_values(&self, range: &str) -> StoreResult<Vec<Vec<String>>> {
        tracing::debug!(range, "get values");
        let url = self.values_url(range, "");
        let response = self.send(self.client.get(url), range).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::transport(format!("Failed to parse values: {e}")))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        tracing::debug!(range, rows = rows.len(), "append values");
        let mut url = self.values_url(range, ":append");
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        self.write_values(self.client.post(url), range, rows, range)
            .await
    }

    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        tracing::debug!(range, rows = rows.len(), "update values");
        let mut url = self.values_url(range, "");
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        self.write_values(self.client.put(url), range, rows, range)
            .await
    }

    async fn batch_update(&self, requests: Vec<BatchRequest>) -> StoreResult<Vec<BatchReply>> {
        tracing::debug!(requests = requests.len(), "batch update");
        let url = self.url(":batchUpdate", &[]);
        let body = json!({
            "requests": requests.iter().map(batch_request_json).collect::<Vec<_>>(),
        });

        let response = self
            .send(self.client.post(url).json(&body), "batchUpdate")
            .await?;
        let body: BatchUpdateResponse = response
            .json()
            .await
            .map_err(|e| StoreError::transport(format!("Failed to parse batch reply: {e}")))?;

        let mut replies = body
            .replies
            .into_iter()
            .map(batch_reply)
            .collect::<StoreResult<Vec<_>>>()?;
        replies.resize(requests.len(), BatchReply::Empty);
        Ok(replies)
    }
}
