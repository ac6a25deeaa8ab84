//! The remote file-and-spreadsheet capability set, with one client backed by
//! the Google REST APIs and one backed by in-memory data for tests.

mod google;
mod test_client;
mod token;
pub mod types;

use crate::Result;
use types::{
    AppendParams, AppendResponse, BatchReadParams, BatchReadResponse, CreateFileRequest,
    FileResource, ListFilesParams, ListFilesResponse, SpreadsheetCreateRequest,
    SpreadsheetCreateResponse, UpdateFileRequest, ValueRange,
};

pub use google::GoogleClient;
pub use test_client::TestClient;
pub use token::{StaticToken, TokenProvider};

pub(crate) const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub(crate) const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
pub(crate) const TEXT_MIME_TYPE: &str = "text/plain";

/// Everything the storage layer needs from the remote provider.
///
/// Each method is one request/response pair against an authenticated file or
/// spreadsheet endpoint; any non-2xx response surfaces as a
/// [`RemoteApiError`](crate::RemoteApiError) in the error chain. Calls are
/// attempted exactly once at this level (the HTTP client may transparently
/// retry once after refreshing an expired credential).
#[async_trait::async_trait]
pub trait RemoteClient {
    /// Searches Drive for files matching the query, in the requested order.
    async fn list_files(&mut self, params: ListFilesParams) -> Result<ListFilesResponse>;

    /// Creates a file or folder and returns it with its assigned id.
    async fn create_file(&mut self, file: CreateFileRequest) -> Result<FileResource>;

    /// Patches file metadata, optionally moving it under additional parents.
    async fn update_file(
        &mut self,
        file_id: &str,
        update: UpdateFileRequest,
        add_parents: &[String],
    ) -> Result<FileResource>;

    /// Replaces the binary content of an existing file.
    async fn upload_file_content(
        &mut self,
        file_id: &str,
        content_type: &str,
        body: String,
    ) -> Result<FileResource>;

    /// Downloads the content of a text file.
    async fn download_text_file(&mut self, file_id: &str) -> Result<String>;

    /// Creates a spreadsheet with the given sheets and seed cells.
    async fn spreadsheet_create(
        &mut self,
        request: SpreadsheetCreateRequest,
    ) -> Result<SpreadsheetCreateResponse>;

    /// Appends rows after the last table row of the sheet named by `range`.
    async fn spreadsheet_append(
        &mut self,
        spreadsheet_id: &str,
        range: &str,
        params: AppendParams,
        body: ValueRange,
    ) -> Result<AppendResponse>;

    /// Reads several ranges of one spreadsheet in a single call.
    async fn spreadsheet_batch_read(
        &mut self,
        spreadsheet_id: &str,
        params: BatchReadParams,
    ) -> Result<BatchReadResponse>;
}
