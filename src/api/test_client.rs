//! Implements the `RemoteClient` trait using in-memory data for testing.
//!
//! Note: this is compiled even in the "production" version of this crate so
//! that the whole storage layer can be exercised top-to-bottom without
//! touching the Google APIs. The backing state sits behind an `Arc` so a
//! test can keep a handle and inspect what the storage layer did remotely.

use crate::api::types::{
    AppendParams, AppendResponse, AppendUpdates, BatchReadParams, BatchReadResponse,
    CreateFileRequest, Dimension, FileResource, ListFilesParams, ListFilesResponse, OrderDirection,
    SpreadsheetCreateRequest, SpreadsheetCreateResponse, UpdateFileRequest, ValueRange,
};
use crate::api::RemoteClient;
use crate::Result;
use anyhow::Context;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A `RemoteClient` holding Drive files and spreadsheets in memory. Clones
/// share the same state, standing in for several sessions against the same
/// remote account.
#[derive(Default, Clone)]
pub struct TestClient {
    state: Arc<Mutex<TestState>>,
}

/// Everything the fake provider remembers, plus call counters for assertions.
#[derive(Debug, Default)]
pub(crate) struct TestState {
    /// Drive resources in creation order.
    files: Vec<FileResource>,
    /// Uploaded text content by file id.
    contents: BTreeMap<String, String>,
    /// Spreadsheet cell data by spreadsheet id.
    spreadsheets: BTreeMap<String, TestSpreadsheet>,
    next_id: u64,
    pub(crate) list_calls: usize,
    pub(crate) create_calls: usize,
    pub(crate) batch_read_calls: usize,
    pub(crate) append_calls: Vec<AppendCall>,
}

#[derive(Debug, Clone)]
pub(crate) struct AppendCall {
    pub(crate) spreadsheet_id: String,
    pub(crate) range: String,
    pub(crate) values: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct TestSpreadsheet {
    pub(crate) tabs: Vec<TestTab>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct TestTab {
    pub(crate) title: String,
    pub(crate) rows: Vec<Vec<Value>>,
}

impl TestState {
    fn assign_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:04}", self.next_id)
    }

    pub(crate) fn file(&self, id: &str) -> Option<&FileResource> {
        self.files.iter().find(|f| f.id == id)
    }

    pub(crate) fn file_count(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn content(&self, id: &str) -> Option<&String> {
        self.contents.get(id)
    }

    pub(crate) fn spreadsheet(&self, id: &str) -> Option<&TestSpreadsheet> {
        self.spreadsheets.get(id)
    }
}

impl TestClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, TestState> {
        self.state.lock().unwrap()
    }

    /// Matches a file against the search clauses of a listing.
    fn matches(file: &FileResource, params: &ListFilesParams) -> bool {
        if let Some(mime_type) = &params.query.mime_type {
            if file.mime_type.as_ref() != Some(mime_type) {
                return false;
            }
        }
        if let Some(parent) = &params.query.parent {
            let parents = file.parents.clone().unwrap_or_default();
            if !parents.contains(parent) {
                return false;
            }
        }
        let properties = file.app_properties.clone().unwrap_or_default();
        params
            .query
            .app_properties
            .iter()
            .all(|(k, v)| properties.get(k) == Some(v))
    }
}

#[async_trait::async_trait]
impl RemoteClient for TestClient {
    async fn list_files(&mut self, params: ListFilesParams) -> Result<ListFilesResponse> {
        let mut state = self.state();
        state.list_calls += 1;
        let mut files: Vec<FileResource> = state
            .files
            .iter()
            .filter(|f| Self::matches(f, &params))
            .cloned()
            .collect();
        // Creation order stands in for createdTime.
        if params
            .order_by
            .first()
            .is_some_and(|o| o.direction == OrderDirection::Desc)
        {
            files.reverse();
        }
        Ok(ListFilesResponse { files })
    }

    async fn create_file(&mut self, file: CreateFileRequest) -> Result<FileResource> {
        let mut state = self.state();
        state.create_calls += 1;
        let id = state.assign_id("file");
        let resource = FileResource {
            id,
            name: file.name,
            mime_type: Some(file.mime_type),
            parents: file.parents,
            app_properties: file.app_properties,
        };
        state.files.push(resource.clone());
        Ok(resource)
    }

    async fn update_file(
        &mut self,
        file_id: &str,
        update: UpdateFileRequest,
        add_parents: &[String],
    ) -> Result<FileResource> {
        let mut state = self.state();
        let file = state
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .with_context(|| format!("File '{file_id}' not found"))?;
        if let Some(name) = update.name {
            file.name = name;
        }
        if let Some(mime_type) = update.mime_type {
            file.mime_type = Some(mime_type);
        }
        if let Some(properties) = update.app_properties {
            file.app_properties = Some(properties);
        }
        if !add_parents.is_empty() {
            file.parents
                .get_or_insert_with(Vec::new)
                .extend(add_parents.iter().cloned());
        }
        Ok(file.clone())
    }

    async fn upload_file_content(
        &mut self,
        file_id: &str,
        _content_type: &str,
        body: String,
    ) -> Result<FileResource> {
        let mut state = self.state();
        let resource = state
            .file(file_id)
            .with_context(|| format!("File '{file_id}' not found"))?
            .clone();
        state.contents.insert(file_id.to_string(), body);
        Ok(resource)
    }

    async fn download_text_file(&mut self, file_id: &str) -> Result<String> {
        let state = self.state();
        state
            .content(file_id)
            .cloned()
            .with_context(|| format!("File '{file_id}' has no content"))
    }

    async fn spreadsheet_create(
        &mut self,
        request: SpreadsheetCreateRequest,
    ) -> Result<SpreadsheetCreateResponse> {
        let mut state = self.state();
        state.create_calls += 1;
        let id = state.assign_id("spreadsheet");

        let mut sheets = request.sheets;
        sheets.sort_by_key(|s| s.properties.index);
        let tabs = sheets
            .into_iter()
            .map(|sheet| TestTab {
                title: sheet.properties.title,
                rows: sheet
                    .data
                    .iter()
                    .flat_map(|grid| &grid.row_data)
                    .map(|row| row.values.iter().map(|c| c.user_entered_value.as_json()).collect())
                    .collect(),
            })
            .collect();
        state.spreadsheets.insert(id.clone(), TestSpreadsheet { tabs });

        // The Sheets API also materializes a Drive file for the spreadsheet,
        // initially outside any folder.
        state.files.push(FileResource {
            id: id.clone(),
            name: request.properties.title,
            mime_type: Some(crate::api::SPREADSHEET_MIME_TYPE.to_string()),
            parents: None,
            app_properties: None,
        });
        Ok(SpreadsheetCreateResponse { spreadsheet_id: id })
    }

    async fn spreadsheet_append(
        &mut self,
        spreadsheet_id: &str,
        range: &str,
        _params: AppendParams,
        body: ValueRange,
    ) -> Result<AppendResponse> {
        let mut state = self.state();
        let title = range.split('!').next().unwrap_or(range).to_string();
        let spreadsheet = state
            .spreadsheets
            .get_mut(spreadsheet_id)
            .with_context(|| format!("Spreadsheet '{spreadsheet_id}' not found"))?;
        let tab = spreadsheet
            .tabs
            .iter_mut()
            .find(|t| t.title == title)
            .with_context(|| format!("Sheet '{title}' not found"))?;
        tab.rows.extend(body.values.iter().cloned());
        let updated_rows = body.values.len() as u32;
        let updated_range = format!("{title}!A1:K{}", tab.rows.len());
        state.append_calls.push(AppendCall {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            values: body.values,
        });
        Ok(AppendResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            updates: Some(AppendUpdates {
                updated_range,
                updated_rows,
            }),
        })
    }

    async fn spreadsheet_batch_read(
        &mut self,
        spreadsheet_id: &str,
        params: BatchReadParams,
    ) -> Result<BatchReadResponse> {
        let mut state = self.state();
        state.batch_read_calls += 1;
        let spreadsheet = state
            .spreadsheet(spreadsheet_id)
            .with_context(|| format!("Spreadsheet '{spreadsheet_id}' not found"))?;
        let mut value_ranges = Vec::new();
        for range in &params.ranges {
            let title = range.split('!').next().unwrap_or(range);
            let Some(tab) = spreadsheet.tabs.iter().find(|t| t.title == title) else {
                continue;
            };
            value_ranges.push(ValueRange {
                range: format!("{title}!A1:K{}", tab.rows.len().max(1)),
                major_dimension: Some(Dimension::Rows),
                values: tab.rows.clone(),
            });
        }
        Ok(BatchReadResponse { value_ranges })
    }
}
