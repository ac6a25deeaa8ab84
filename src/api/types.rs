//! Request and response shapes for the Drive v3 and Sheets v4 endpoints used
//! by this crate. Field names mirror the wire JSON (camelCase).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameters of a Drive file listing.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct ListFilesParams {
    pub query: ListFilesQuery,
    pub order_by: Vec<OrderBy>,
}

impl ListFilesParams {
    /// Lists matching files most-recently-created first, which is how every
    /// lookup in this crate breaks ties between duplicate resources.
    pub fn newest_first(query: ListFilesQuery) -> Self {
        Self {
            query,
            order_by: vec![OrderBy {
                field: OrderField::CreatedTime,
                direction: OrderDirection::Desc,
            }],
        }
    }
}

/// Search clauses of a Drive file listing. Empty clauses are omitted from the
/// request.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct ListFilesQuery {
    pub parent: Option<String>,
    pub mime_type: Option<String>,
    pub app_properties: BTreeMap<String, String>,
}

impl ListFilesQuery {
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn app_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.app_properties.insert(key.into(), value.into());
        self
    }
}

/// A sortable file attribute.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderField {
    CreatedTime,
    ModifiedTime,
    Name,
}

serde_plain::derive_display_from_serialize!(OrderField);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

serde_plain::derive_display_from_serialize!(OrderDirection);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct OrderBy {
    pub field: OrderField,
    pub direction: OrderDirection,
}

/// A Drive file or folder as returned by the API. The id is an opaque string
/// assigned by the provider; only equality is ever meaningful.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_properties: Option<BTreeMap<String, String>>,
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    #[serde(default)]
    pub files: Vec<FileResource>,
}

/// Body of a Drive file creation.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_properties: Option<BTreeMap<String, String>>,
}

/// Body of a Drive file metadata patch. Parent changes travel separately as
/// the `addParents` query parameter.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_properties: Option<BTreeMap<String, String>>,
}

/// Body of a spreadsheet creation: a title plus the initial sheets, each
/// optionally seeded with cell data.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetCreateRequest {
    pub properties: SpreadsheetProperties,
    pub sheets: Vec<SheetSpec>,
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    pub title: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSpec {
    pub properties: SheetProperties,
    #[serde(default)]
    pub data: Vec<GridData>,
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub index: u32,
    pub title: String,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    pub start_row: u32,
    pub start_column: u32,
    #[serde(default)]
    pub row_data: Vec<RowData>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    #[serde(default)]
    pub values: Vec<CellData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_value: ExtendedValue,
}

/// A typed cell value as the Sheets API represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtendedValue {
    StringValue(String),
    NumberValue(f64),
    BoolValue(bool),
    FormulaValue(String),
}

impl ExtendedValue {
    pub(crate) fn as_json(&self) -> Value {
        match self {
            ExtendedValue::StringValue(s) => Value::from(s.clone()),
            ExtendedValue::NumberValue(n) => Value::from(*n),
            ExtendedValue::BoolValue(b) => Value::from(*b),
            ExtendedValue::FormulaValue(s) => Value::from(s.clone()),
        }
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetCreateResponse {
    pub spreadsheet_id: String,
}

/// A rectangular block of cell values tied to an A1 range.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<Dimension>,
    /// Omitted on the wire when the range is empty.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

serde_plain::derive_display_from_serialize!(Dimension);

/// How appended or updated cell text is interpreted by the sheet engine.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Stored verbatim.
    Raw,
    /// Parsed as if typed into the UI, so dates and numbers become typed
    /// cells instead of literal text.
    UserEntered,
}

serde_plain::derive_display_from_serialize!(ValueInputOption);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsertDataOption {
    /// Writes over whatever follows the table.
    Overwrite,
    /// Inserts fresh rows for the new data, never touching existing ones.
    InsertRows,
}

serde_plain::derive_display_from_serialize!(InsertDataOption);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueRenderOption {
    FormattedValue,
    UnformattedValue,
    Formula,
}

serde_plain::derive_display_from_serialize!(ValueRenderOption);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AppendParams {
    pub value_input_option: ValueInputOption,
    pub insert_data_option: InsertDataOption,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<AppendUpdates>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendUpdates {
    #[serde(default)]
    pub updated_range: String,
    #[serde(default)]
    pub updated_rows: u32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BatchReadParams {
    pub ranges: Vec<String>,
    pub major_dimension: Dimension,
    pub value_render_option: ValueRenderOption,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReadResponse {
    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}
