//! Ledger operations against the yearly spreadsheets: resolving the
//! spreadsheet for each year, appending movements, and reading months back.

use crate::api::types::{
    AppendParams, BatchReadParams, CellData, Dimension, ExtendedValue, GridData, InsertDataOption,
    ListFilesParams, ListFilesQuery, RowData, SheetProperties, SheetSpec, SpreadsheetCreateRequest,
    SpreadsheetProperties, UpdateFileRequest, ValueInputOption, ValueRange, ValueRenderOption,
};
use crate::api::{RemoteClient, SPREADSHEET_MIME_TYPE};
use crate::config::TransactionCategory;
use crate::model::{month_from_sheet_title, Transaction, MONTH_NAMES, TRANSACTION_HEADERS};
use crate::storage::{StorageState, FILE_TYPE_KEY, MOVEMENTS_FILE_TYPE, YEAR_KEY};
use crate::Result;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace};

/// One monthly sheet of a yearly spreadsheet: a calendar year and a 0-based
/// month index.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

/// The parsed transactions of one monthly sheet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MonthData {
    pub year: i32,
    pub month: u32,
    pub data: Vec<Transaction>,
}

/// The ledger side of a remote-storage session. Owns the client and the
/// resolution state produced by bootstrap; every operation funnels through
/// [`LedgerStore::resolve_years`] so a year's spreadsheet is looked up or
/// created at most once per session.
pub struct LedgerStore {
    client: Box<dyn RemoteClient + Send>,
    state: StorageState,
}

impl LedgerStore {
    pub(crate) fn new(client: Box<dyn RemoteClient + Send>, state: StorageState) -> Self {
        Self { client, state }
    }

    pub fn state(&self) -> &StorageState {
        &self.state
    }

    /// Resolves the spreadsheet id for each requested year, creating the
    /// spreadsheet if the year has none yet. Cached years cost nothing; the
    /// rest take one listing and possibly a creation each. Newly resolved ids
    /// are merged into the session cache before returning.
    pub async fn resolve_years(
        &mut self,
        years: &BTreeSet<String>,
    ) -> Result<HashMap<String, String>> {
        let mut resolved = HashMap::new();
        for year in years {
            if let Some(id) = self.state.cached(year) {
                trace!("year {year} already resolved to {id}");
                resolved.insert(year.clone(), id.to_string());
                continue;
            }
            let id = self.find_or_create_year(year).await?;
            resolved.insert(year.clone(), id);
        }
        self.state.merge(&resolved);
        Ok(resolved)
    }

    async fn find_or_create_year(&mut self, year: &str) -> Result<String> {
        let listed = self
            .client
            .list_files(ListFilesParams::newest_first(
                ListFilesQuery::default()
                    .mime_type(SPREADSHEET_MIME_TYPE)
                    .parent(self.state.root_folder_id())
                    .app_property(FILE_TYPE_KEY, MOVEMENTS_FILE_TYPE)
                    .app_property(YEAR_KEY, year),
            ))
            .await?;
        if let Some(file) = listed.files.into_iter().next() {
            debug!("using existing spreadsheet {} for year {year}", file.id);
            return Ok(file.id);
        }
        self.create_year_spreadsheet(year).await
    }

    /// Creates a yearly spreadsheet with one sheet per month, each seeded
    /// with the header row, then files it under the root folder with the
    /// year and file-type properties so later listings can find it.
    async fn create_year_spreadsheet(&mut self, year: &str) -> Result<String> {
        debug!("creating spreadsheet for year {year}");
        let header_row = RowData {
            values: TRANSACTION_HEADERS
                .iter()
                .map(|label| CellData {
                    user_entered_value: ExtendedValue::StringValue(label.to_string()),
                })
                .collect(),
        };
        let sheets = MONTH_NAMES
            .iter()
            .enumerate()
            .map(|(index, title)| SheetSpec {
                properties: SheetProperties {
                    index: index as u32,
                    title: title.to_string(),
                },
                data: vec![GridData {
                    start_row: 0,
                    start_column: 0,
                    row_data: vec![header_row.clone()],
                }],
            })
            .collect();

        let created = self
            .client
            .spreadsheet_create(SpreadsheetCreateRequest {
                properties: SpreadsheetProperties {
                    title: format!("Pefin {year} report"),
                },
                sheets,
            })
            .await?;

        let root_folder_id = self.state.root_folder_id().to_string();
        self.client
            .update_file(
                &created.spreadsheet_id,
                UpdateFileRequest {
                    name: Some(format!("{year}.xls")),
                    mime_type: Some(SPREADSHEET_MIME_TYPE.to_string()),
                    app_properties: Some(BTreeMap::from([
                        (FILE_TYPE_KEY.to_string(), MOVEMENTS_FILE_TYPE.to_string()),
                        (YEAR_KEY.to_string(), year.to_string()),
                    ])),
                },
                &[root_folder_id],
            )
            .await
            .with_context(|| format!("Failed to file the year {year} spreadsheet"))?;
        Ok(created.spreadsheet_id)
    }

    /// Appends one hand-entered movement. The category supplies the group
    /// and the direction; notes are free text and the currency is fixed.
    pub async fn insert_movement(
        &mut self,
        date: NaiveDate,
        category: &TransactionCategory,
        notes: impl Into<String>,
        amount: Decimal,
    ) -> Result<()> {
        let transaction =
            Transaction::new(date, category.kind.into(), category.name.clone(), amount)
                .with_group(category.group.clone())
                .with_notes(notes);
        self.batch_import_transactions(vec![transaction]).await
    }

    /// Appends a batch of transactions, grouping them into one append call
    /// per touched monthly sheet. Within a sheet the rows keep their input
    /// order. No duplicate detection happens here; appending the same batch
    /// twice stores it twice.
    pub async fn batch_import_transactions(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<()> {
        if transactions.is_empty() {
            return Ok(());
        }
        let years: BTreeSet<String> = transactions.iter().map(|t| t.year_key()).collect();
        let resolved = self.resolve_years(&years).await?;

        let mut sheets: BTreeMap<(String, u32), Vec<Vec<Value>>> = BTreeMap::new();
        for transaction in &transactions {
            sheets
                .entry((transaction.year_key(), transaction.month0()))
                .or_default()
                .push(transaction.to_row());
        }
        debug!(
            "appending {} transactions across {} monthly sheets",
            transactions.len(),
            sheets.len()
        );
        for ((year, month), rows) in sheets {
            let spreadsheet_id = resolved
                .get(&year)
                .with_context(|| format!("Year {year} was not resolved"))?
                .clone();
            let range = MONTH_NAMES[month as usize];
            self.client
                .spreadsheet_append(
                    &spreadsheet_id,
                    range,
                    AppendParams {
                        value_input_option: ValueInputOption::UserEntered,
                        insert_data_option: InsertDataOption::InsertRows,
                    },
                    ValueRange {
                        range: range.to_string(),
                        major_dimension: Some(Dimension::Rows),
                        values: rows,
                    },
                )
                .await?;
        }
        Ok(())
    }

    /// Reads the requested monthly sheets, one batch call per touched year,
    /// and parses their rows. Rows that do not look like transactions (the
    /// header row, stray edits) are dropped silently.
    pub async fn batch_read_months(&mut self, months: &[MonthRef]) -> Result<Vec<MonthData>> {
        for month in months {
            if month.month >= MONTH_NAMES.len() as u32 {
                bail!("Month index {} is out of range", month.month);
            }
        }
        let years: BTreeSet<String> = months.iter().map(|m| m.year.to_string()).collect();
        let resolved = self.resolve_years(&years).await?;

        let mut result = Vec::new();
        for year in &years {
            let spreadsheet_id = resolved
                .get(year)
                .with_context(|| format!("Year {year} was not resolved"))?
                .clone();
            let year_number: i32 = year.parse().context("Invalid year key")?;
            let ranges = months
                .iter()
                .filter(|m| m.year == year_number)
                .map(|m| MONTH_NAMES[m.month as usize].to_string())
                .collect();
            let response = self
                .client
                .spreadsheet_batch_read(
                    &spreadsheet_id,
                    BatchReadParams {
                        ranges,
                        major_dimension: Dimension::Rows,
                        value_render_option: ValueRenderOption::UnformattedValue,
                    },
                )
                .await?;
            for value_range in &response.value_ranges {
                let title = value_range
                    .range
                    .split('!')
                    .next()
                    .unwrap_or(&value_range.range);
                let Some(month) = month_from_sheet_title(title) else {
                    continue;
                };
                let data = value_range
                    .values
                    .iter()
                    .filter_map(|row| Transaction::from_row(row))
                    .collect();
                result.push(MonthData {
                    year: year_number,
                    month,
                    data,
                });
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestClient;
    use crate::config::default_app_configuration;
    use crate::model::TransactionType;
    use crate::storage::BootstrapResolver;
    use rust_decimal_macros::dec;
    use serde_json::json;

    async fn store(client: &TestClient) -> LedgerStore {
        let (store, _) = BootstrapResolver::new(Box::new(client.clone()))
            .initialize()
            .await
            .unwrap();
        store
    }

    fn years(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|y| y.to_string()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_years_creates_spreadsheet_with_monthly_sheets() {
        let client = TestClient::new();
        let mut store = store(&client).await;

        let resolved = store.resolve_years(&years(&["2024"])).await.unwrap();
        let id = resolved.get("2024").unwrap();

        let state = client.state();
        let spreadsheet = state.spreadsheet(id).unwrap();
        assert_eq!(spreadsheet.tabs.len(), 12);
        let titles: Vec<&str> = spreadsheet.tabs.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, MONTH_NAMES);
        let headers: Vec<Value> = TRANSACTION_HEADERS.iter().map(|h| json!(h)).collect();
        for tab in &spreadsheet.tabs {
            assert_eq!(tab.rows, vec![headers.clone()]);
        }

        let file = state.file(id).unwrap();
        assert_eq!(file.name, "2024.xls");
        let properties = file.app_properties.as_ref().unwrap();
        assert_eq!(properties.get("fileType").unwrap(), "pefin.movements");
        assert_eq!(properties.get("year").unwrap(), "2024");
        assert_eq!(
            file.parents.as_ref().unwrap(),
            &vec![store.state().root_folder_id().to_string()]
        );
    }

    #[tokio::test]
    async fn test_resolve_years_caches_within_a_session() {
        let client = TestClient::new();
        let mut store = store(&client).await;

        let first = store.resolve_years(&years(&["2024"])).await.unwrap();
        let list_calls = client.state().list_calls;
        let create_calls = client.state().create_calls;

        let second = store.resolve_years(&years(&["2024"])).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.state().list_calls, list_calls);
        assert_eq!(client.state().create_calls, create_calls);
        assert_eq!(store.state().cached("2024"), first.get("2024").map(|s| s.as_str()));
    }

    #[tokio::test]
    async fn test_resolve_years_reuses_spreadsheet_across_sessions() {
        let client = TestClient::new();
        let mut first = store(&client).await;
        let created = first.resolve_years(&years(&["2024"])).await.unwrap();
        let file_count = client.state().file_count();

        // A later session starts with an empty cache but finds the same file.
        let mut second = store(&client).await;
        let found = second.resolve_years(&years(&["2024"])).await.unwrap();
        assert_eq!(created, found);
        assert_eq!(client.state().file_count(), file_count);
    }

    #[tokio::test]
    async fn test_batch_import_partitions_by_year_and_month() {
        let client = TestClient::new();
        let mut store = store(&client).await;

        let t = |y, m, d, amount| {
            Transaction::new(date(y, m, d), TransactionType::Expense, "Home", amount)
        };
        store
            .batch_import_transactions(vec![
                t(2024, 3, 15, dec!(10)),
                t(2024, 3, 20, dec!(20)),
                t(2024, 7, 1, dec!(30)),
                t(2023, 12, 31, dec!(40)),
            ])
            .await
            .unwrap();

        let state = client.state();
        assert_eq!(state.append_calls.len(), 3);
        let ranges: Vec<&str> = state.append_calls.iter().map(|c| c.range.as_str()).collect();
        assert_eq!(ranges, vec!["DEC", "MAR", "JUL"]);

        let march = &state.append_calls[1];
        assert_eq!(march.values.len(), 2);
        assert_eq!(march.values[0][0], json!("2024-03-15"));
        assert_eq!(march.values[1][0], json!("2024-03-20"));

        // Both years resolved in one pass, two spreadsheets total.
        let spreadsheets: BTreeSet<&str> = state
            .append_calls
            .iter()
            .map(|c| c.spreadsheet_id.as_str())
            .collect();
        assert_eq!(spreadsheets.len(), 2);
    }

    #[tokio::test]
    async fn test_insert_movement_writes_expected_row() {
        let client = TestClient::new();
        let mut store = store(&client).await;
        let config = default_app_configuration();
        let home = &config.categories[0];

        store
            .insert_movement(date(2024, 3, 15), home, "rent", dec!(42.50))
            .await
            .unwrap();

        let state = client.state();
        let call = &state.append_calls[0];
        assert_eq!(call.range, "MAR");
        let row = &call.values[0];
        assert_eq!(row[0], json!("2024-03-15"));
        assert_eq!(row[1], json!("expense"));
        assert_eq!(row[4], json!("Necessities"));
        assert_eq!(row[5], json!("Home"));
        assert_eq!(row[6], json!("rent"));
        assert_eq!(row[8], json!("EUR"));
        assert_eq!(row[9], json!(42.5));
        assert_eq!(row[10], json!("00B134-00109A-0000"));
    }

    #[tokio::test]
    async fn test_batch_read_parses_rows_and_drops_the_rest() {
        let client = TestClient::new();
        let mut store = store(&client).await;
        store
            .batch_import_transactions(vec![
                Transaction::new(date(2024, 3, 15), TransactionType::Expense, "Home", dec!(10))
                    .with_notes("rent"),
                Transaction::new(date(2024, 3, 16), TransactionType::Income, "Other", dec!(20)),
            ])
            .await
            .unwrap();

        // A stray edit left a malformed row in the sheet.
        let spreadsheet_id = store.state().cached("2024").unwrap().to_string();
        let mut writer = client.clone();
        writer
            .spreadsheet_append(
                &spreadsheet_id,
                "MAR",
                AppendParams {
                    value_input_option: ValueInputOption::Raw,
                    insert_data_option: InsertDataOption::InsertRows,
                },
                ValueRange {
                    range: "MAR".to_string(),
                    major_dimension: Some(Dimension::Rows),
                    values: vec![vec![json!("see below"), json!("totals")]],
                },
            )
            .await
            .unwrap();

        let read = store
            .batch_read_months(&[MonthRef { year: 2024, month: 2 }])
            .await
            .unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].year, 2024);
        assert_eq!(read[0].month, 2);
        // Header row and the malformed row are gone.
        assert_eq!(read[0].data.len(), 2);
        assert_eq!(read[0].data[0].notes(), "rent");
        assert_eq!(read[0].data[1].kind(), TransactionType::Income);
    }

    #[tokio::test]
    async fn test_batch_read_spans_years_with_one_call_each() {
        let client = TestClient::new();
        let mut store = store(&client).await;
        store
            .batch_import_transactions(vec![
                Transaction::new(date(2023, 12, 1), TransactionType::Expense, "Home", dec!(1)),
                Transaction::new(date(2024, 1, 2), TransactionType::Expense, "Home", dec!(2)),
                Transaction::new(date(2024, 2, 3), TransactionType::Expense, "Home", dec!(3)),
            ])
            .await
            .unwrap();
        let before = client.state().batch_read_calls;

        let read = store
            .batch_read_months(&[
                MonthRef { year: 2023, month: 11 },
                MonthRef { year: 2024, month: 0 },
                MonthRef { year: 2024, month: 1 },
            ])
            .await
            .unwrap();
        assert_eq!(client.state().batch_read_calls, before + 2);
        assert_eq!(read.len(), 3);
        let totals: Vec<usize> = read.iter().map(|m| m.data.len()).collect();
        assert_eq!(totals, vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_batch_read_rejects_out_of_range_month() {
        let client = TestClient::new();
        let mut store = store(&client).await;
        let result = store
            .batch_read_months(&[MonthRef { year: 2024, month: 12 }])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reading_an_unwritten_month_yields_no_transactions() {
        let client = TestClient::new();
        let mut store = store(&client).await;
        let read = store
            .batch_read_months(&[MonthRef { year: 2024, month: 5 }])
            .await
            .unwrap();
        assert_eq!(read.len(), 1);
        assert!(read[0].data.is_empty());
    }
}
