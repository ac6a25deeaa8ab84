//! Implements the `RemoteClient` trait against the Google Drive v3 and
//! Sheets v4 REST APIs using `reqwest`.

use crate::api::types::{
    AppendParams, AppendResponse, BatchReadParams, BatchReadResponse, CreateFileRequest,
    FileResource, ListFilesParams, ListFilesResponse, SpreadsheetCreateRequest,
    SpreadsheetCreateResponse, UpdateFileRequest, ValueRange,
};
use crate::api::{RemoteClient, TokenProvider};
use crate::error::RemoteApiError;
use crate::Result;
use anyhow::Context;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// A `RemoteClient` backed by the Google REST APIs. It takes a
/// `TokenProvider` at construction and asks it for a replacement token
/// whenever the provider answers `401`, retrying the rejected request once.
pub struct GoogleClient {
    http: reqwest::Client,
    token_provider: Box<dyn TokenProvider>,
}

impl GoogleClient {
    pub fn new(token_provider: Box<dyn TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_provider,
        }
    }

    /// Sends a request with bearer auth and returns the response body text.
    /// On `401` the credential is refreshed and the request is retried
    /// exactly once; any other non-2xx status becomes a `RemoteApiError`.
    async fn send(&mut self, request: reqwest::RequestBuilder) -> Result<String> {
        let token = self.token_provider.access_token().await?;
        let retry = request.try_clone();
        let response = request
            .bearer_auth(&token)
            .send()
            .await
            .context("Failed to reach the remote API")?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(retry) = retry {
                debug!("credential rejected, refreshing and retrying once");
                let token = self.token_provider.refresh().await?;
                let response = retry
                    .bearer_auth(&token)
                    .send()
                    .await
                    .context("Failed to reach the remote API on retry")?;
                return read_body(response).await;
            }
        }
        read_body(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &mut self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).context("Failed to parse the remote API response")
    }
}

/// Checks the response status and extracts the body text.
async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read the remote API response body")?;
    if !status.is_success() {
        return Err(RemoteApiError::from_response(status.as_u16(), body).into());
    }
    Ok(body)
}

/// Renders the Drive search query and ordering as `files.list` parameters.
fn files_list_query(params: &ListFilesParams) -> Vec<(String, String)> {
    let mut clauses = Vec::new();
    if let Some(mime_type) = &params.query.mime_type {
        clauses.push(format!("mimeType='{mime_type}'"));
    }
    if let Some(parent) = &params.query.parent {
        clauses.push(format!("'{parent}' in parents"));
    }
    if !params.query.app_properties.is_empty() {
        let properties = params
            .query
            .app_properties
            .iter()
            .map(|(k, v)| format!("appProperties has {{ key='{k}' and value='{v}' }}"))
            .collect::<Vec<_>>()
            .join(" and ");
        clauses.push(format!("({properties})"));
    }

    let mut pairs = vec![("q".to_string(), clauses.join(" and "))];
    if !params.order_by.is_empty() {
        let order = params
            .order_by
            .iter()
            .map(|o| format!("{} {}", o.field, o.direction))
            .collect::<Vec<_>>()
            .join(",");
        pairs.push(("orderBy".to_string(), order));
    }
    pairs.push(("fields".to_string(), "files(id,name,mimeType,parents,appProperties)".to_string()));
    pairs
}

#[async_trait::async_trait]
impl RemoteClient for GoogleClient {
    async fn list_files(&mut self, params: ListFilesParams) -> Result<ListFilesResponse> {
        trace!("list_files {params:?}");
        let request = self.http.get(DRIVE_FILES_URL).query(&files_list_query(&params));
        self.send_json(request)
            .await
            .context("Failed to list files")
    }

    async fn create_file(&mut self, file: CreateFileRequest) -> Result<FileResource> {
        trace!("create_file {}", file.name);
        let request = self.http.post(DRIVE_FILES_URL).json(&file);
        self.send_json(request)
            .await
            .with_context(|| format!("Failed to create file '{}'", file.name))
    }

    async fn update_file(
        &mut self,
        file_id: &str,
        update: UpdateFileRequest,
        add_parents: &[String],
    ) -> Result<FileResource> {
        trace!("update_file {file_id}");
        let mut request = self
            .http
            .patch(format!("{DRIVE_FILES_URL}/{file_id}"))
            .json(&update);
        if !add_parents.is_empty() {
            request = request.query(&[("addParents", add_parents.join(","))]);
        }
        self.send_json(request)
            .await
            .with_context(|| format!("Failed to update file '{file_id}'"))
    }

    async fn upload_file_content(
        &mut self,
        file_id: &str,
        content_type: &str,
        body: String,
    ) -> Result<FileResource> {
        trace!("upload_file_content {file_id}");
        let request = self
            .http
            .patch(format!("{DRIVE_UPLOAD_URL}/{file_id}"))
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);
        self.send_json(request)
            .await
            .with_context(|| format!("Failed to upload content for file '{file_id}'"))
    }

    async fn download_text_file(&mut self, file_id: &str) -> Result<String> {
        trace!("download_text_file {file_id}");
        let request = self
            .http
            .get(format!("{DRIVE_FILES_URL}/{file_id}"))
            .query(&[("alt", "media")]);
        self.send(request)
            .await
            .with_context(|| format!("Failed to download file '{file_id}'"))
    }

    async fn spreadsheet_create(
        &mut self,
        request: SpreadsheetCreateRequest,
    ) -> Result<SpreadsheetCreateResponse> {
        trace!("spreadsheet_create '{}'", request.properties.title);
        let request = self.http.post(SHEETS_URL).json(&request);
        self.send_json(request)
            .await
            .context("Failed to create spreadsheet")
    }

    async fn spreadsheet_append(
        &mut self,
        spreadsheet_id: &str,
        range: &str,
        params: AppendParams,
        body: ValueRange,
    ) -> Result<AppendResponse> {
        trace!("spreadsheet_append {spreadsheet_id} {range}");
        let request = self
            .http
            .post(format!("{SHEETS_URL}/{spreadsheet_id}/values/{range}:append"))
            .query(&[
                ("valueInputOption", params.value_input_option.to_string()),
                ("insertDataOption", params.insert_data_option.to_string()),
            ])
            .json(&body);
        self.send_json(request)
            .await
            .with_context(|| format!("Failed to append rows to range '{range}'"))
    }

    async fn spreadsheet_batch_read(
        &mut self,
        spreadsheet_id: &str,
        params: BatchReadParams,
    ) -> Result<BatchReadResponse> {
        trace!("spreadsheet_batch_read {spreadsheet_id} {:?}", params.ranges);
        let mut pairs: Vec<(&str, String)> = params
            .ranges
            .iter()
            .map(|r| ("ranges", r.clone()))
            .collect();
        pairs.push(("majorDimension", params.major_dimension.to_string()));
        pairs.push(("valueRenderOption", params.value_render_option.to_string()));
        let request = self
            .http
            .get(format!("{SHEETS_URL}/{spreadsheet_id}/values:batchGet"))
            .query(&pairs);
        self.send_json(request)
            .await
            .with_context(|| format!("Failed to batch-read spreadsheet '{spreadsheet_id}'"))
    }
}
