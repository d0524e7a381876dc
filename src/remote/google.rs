//! Google Sheets v4 / Drive v3 client over plain HTTP.
//!
//! Token acquisition is not handled here: the client is given a ready OAuth
//! bearer token (config value or environment variable).

use super::{DocumentHandle, DriveFile, Region, RegionId, SheetsService, WriteConfirmation};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Connection settings for the spreadsheet service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,

    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    /// Bearer token; takes precedence over `access_token_env`.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_access_token_env() -> String {
    "TURNOUT_ACCESS_TOKEN".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            sheets_base_url: default_sheets_base_url(),
            drive_base_url: default_drive_base_url(),
            access_token: None,
            access_token_env: default_access_token_env(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    /// Resolve the bearer token from config or the environment.
    pub fn resolve_access_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.trim().is_empty()) {
            return Ok(token.clone());
        }
        match std::env::var(&self.access_token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(ApiError::ConfigError(format!(
                "No access token. Set remote.access_token or the {} environment variable",
                self.access_token_env
            ))),
        }
    }
}

fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        return map_status(status.as_u16(), &error.to_string());
    }
    if error.is_timeout() {
        ApiError::RemoteRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::RemoteRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::RemoteRequestFailed(format!("HTTP error: {}", error))
    }
}

fn map_status(status: u16, detail: &str) -> ApiError {
    match status {
        401 => ApiError::RemoteAuthFailed(format!("Authentication failed: {}", detail)),
        429 => ApiError::RemoteRateLimit(format!("Rate limit exceeded: {}", detail)),
        404 => ApiError::RemoteNotFound(detail.to_string()),
        _ => ApiError::RemoteRequestFailed(format!(
            "Request failed with status {}: {}",
            status, detail
        )),
    }
}

/// Render a cell the way the values API shows it as text.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Quote a literal for use inside a Drive query string.
pub fn quote_query_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[derive(Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: RegionId,
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResponse {
    spreadsheet_id: String,
    properties: SpreadsheetProperties,
}

#[derive(Deserialize)]
struct SheetsOnly {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_range: String,
    #[serde(default)]
    updated_cells: usize,
}

#[derive(Deserialize)]
struct FileEntry {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileEntry>,
    next_page_token: Option<String>,
}

/// HTTP implementation of [`SheetsService`].
pub struct GoogleSheetsClient {
    client: Client,
    sheets_base: Url,
    drive_base: Url,
    token: String,
}

impl GoogleSheetsClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, ApiError> {
        let token = config.resolve_access_token()?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            sheets_base: parse_base(&config.sheets_base_url)?,
            drive_base: parse_base(&config.drive_base_url)?,
            token,
        })
    }

    fn url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::ConfigError(format!("Base URL cannot be a base: {}", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.token)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(map_http_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(map_status(status.as_u16(), &error_text))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::RemoteResponse(format!("Failed to parse response: {}", e)))
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::ConfigError(format!("Invalid base URL {}: {}", raw, e)))
}

#[async_trait]
impl SheetsService for GoogleSheetsClient {
    async fn read_rows(&self, source_id: &str, range: &str) -> Result<Vec<Vec<String>>, ApiError> {
        let url = Self::url(&self.sheets_base, &["spreadsheets", source_id, "values", range])?;
        let body: ValueRangeResponse = self.send_json(self.request(Method::GET, url)).await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn create_document(&self, title: &str) -> Result<DocumentHandle, ApiError> {
        let url = Self::url(&self.sheets_base, &["spreadsheets"])?;
        let body: SpreadsheetResponse = self
            .send_json(
                self.request(Method::POST, url)
                    .json(&json!({ "properties": { "title": title } })),
            )
            .await?;
        Ok(DocumentHandle {
            document_id: body.spreadsheet_id,
            title: body.properties.title,
        })
    }

    async fn list_regions(&self, document_id: &str) -> Result<Vec<Region>, ApiError> {
        let url = Self::url(&self.sheets_base, &["spreadsheets", document_id])?;
        let body: SheetsOnly = self
            .send_json(
                self.request(Method::GET, url)
                    .query(&[("fields", "sheets.properties(sheetId,title)")]),
            )
            .await?;
        Ok(body
            .sheets
            .into_iter()
            .map(|s| Region {
                region_id: s.properties.sheet_id,
                title: s.properties.title,
            })
            .collect())
    }

    async fn copy_template_into(
        &self,
        source_id: &str,
        template_region_id: RegionId,
        destination_id: &str,
    ) -> Result<RegionId, ApiError> {
        let copy_segment = format!("{}:copyTo", template_region_id);
        let url = Self::url(
            &self.sheets_base,
            &["spreadsheets", source_id, "sheets", &copy_segment],
        )?;
        let body: SheetProperties = self
            .send_json(
                self.request(Method::POST, url)
                    .json(&json!({ "destinationSpreadsheetId": destination_id })),
            )
            .await?;
        debug!(
            destination_id,
            region_id = body.sheet_id,
            title = %body.title,
            "Copied template region"
        );
        Ok(body.sheet_id)
    }

    async fn normalize_regions(
        &self,
        destination_id: &str,
        obsolete_region_id: RegionId,
        new_region_id: RegionId,
        canonical_name: &str,
    ) -> Result<(), ApiError> {
        let segment = format!("{}:batchUpdate", destination_id);
        let url = Self::url(&self.sheets_base, &["spreadsheets", &segment])?;
        // Delete first so the rename cannot collide with the default region's title.
        let requests = json!({
            "requests": [
                { "deleteSheet": { "sheetId": obsolete_region_id } },
                {
                    "updateSheetProperties": {
                        "properties": { "sheetId": new_region_id, "title": canonical_name },
                        "fields": "title"
                    }
                }
            ]
        });
        self.send(self.request(Method::POST, url).json(&requests))
            .await?;
        Ok(())
    }

    async fn write_range(
        &self,
        document_id: &str,
        range_spec: &str,
        columns: &[&[String]],
    ) -> Result<WriteConfirmation, ApiError> {
        let url = Self::url(
            &self.sheets_base,
            &["spreadsheets", document_id, "values", range_spec],
        )?;
        let body: UpdateValuesResponse = self
            .send_json(
                self.request(Method::PUT, url)
                    .query(&[("valueInputOption", "RAW")])
                    .json(&json!({
                        "range": range_spec,
                        "majorDimension": "COLUMNS",
                        "values": columns,
                    })),
            )
            .await?;
        Ok(WriteConfirmation {
            updated_range: body.updated_range,
            updated_cells: body.updated_cells,
        })
    }

    async fn find_documents(&self, query: &str) -> Result<Vec<DriveFile>, ApiError> {
        let url = Self::url(&self.drive_base, &["files"])?;
        let full_query = format!(
            "mimeType = {} and trashed = false and ({})",
            quote_query_literal(SPREADSHEET_MIME_TYPE),
            query
        );
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut builder = self.request(Method::GET, url.clone()).query(&[
                ("q", full_query.as_str()),
                ("fields", "nextPageToken,files(id,name)"),
                ("pageSize", "1000"),
            ]);
            if let Some(token) = &page_token {
                builder = builder.query(&[("pageToken", token.as_str())]);
            }
            let page: FileListResponse = self.send_json(builder).await?;
            files.extend(page.files.into_iter().map(|f| DriveFile {
                name: f.name,
                document_id: f.id,
            }));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(files)
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), ApiError> {
        let url = Self::url(&self.drive_base, &["files", document_id])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
