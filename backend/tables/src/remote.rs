//! # Google Sheets
//!
//! Each table is a tab of one spreadsheet, addressed in A1 notation through the Sheets v4
//! `values` endpoints. Every write uses `valueInputOption=RAW` so cells are stored verbatim.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | read      | `GET values/{tab}!A1:Z` |
//! | append    | `POST values/{tab}!A:{last}:append` |
//! | row       | `PUT values/{tab}!A{n}:{last}{n}` |
//! | cells     | `POST values:batchUpdate` |
//! | table     | `PUT values/{tab}!A1:{last}{rows + 1}` |
//!
//! Tabs are provisioned by hand in the spreadsheet, nothing here creates them.
use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    CellUpdate, Result, Store, StoreError, Table,
    auth::{ServiceAccountKey, TokenSource},
};

pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Widest column read back from a tab.
const LAST_READ_COLUMN: &str = "Z";

pub struct SheetsStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: TokenSource,
}

#[derive(Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
struct RangeData {
    range: String,
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl SheetsStore {
    pub async fn connect(spreadsheet_id: &str, credentials_path: &Path) -> Result<Self> {
        let key = ServiceAccountKey::from_file(credentials_path).await?;
        let client = Client::new();

        info!(
            "Using spreadsheet {spreadsheet_id} as {}",
            key.client_email
        );

        Ok(Self {
            tokens: TokenSource::new(key, client.clone()),
            client,
            base_url: SHEETS_API.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    /// Point at another Sheets-compatible endpoint. Trailing slashes are dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn values_url(&self, range: &str) -> String {
        format!("{}/{}/values/{range}", self.base_url, self.spreadsheet_id)
    }

    fn batch_url(&self) -> String {
        format!("{}/{}/values:batchUpdate", self.base_url, self.spreadsheet_id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.tokens.token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Sheets request failed with {status}");

        Err(api_error(status, &body))
    }
}

#[async_trait]
impl Store for SheetsStore {
    fn kind(&self) -> &'static str {
        "sheets"
    }

    async fn ensure_table(&self, _table: &str, _columns: &[&str]) -> Result<()> {
        Ok(())
    }

    async fn read_table(&self, table: &str) -> Result<Table> {
        let range = read_range(table);
        debug!("Reading {range}");

        let response = self.send(self.client.get(self.values_url(&range))).await?;
        let body: ValueRange = response.json().await?;

        Ok(table_from_values(body.values))
    }

    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()> {
        let range = format!("{table}!A:{}", column_letter(row.len().max(1)));
        debug!("Appending to {range}");

        let request = self
            .client
            .post(format!("{}:append", self.values_url(&range)))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [row] }));

        self.send(request).await?;

        Ok(())
    }

    async fn write_row(&self, table: &str, index: usize, row: Vec<String>) -> Result<()> {
        let range = row_range(table, index, row.len());
        debug!("Updating {range}");

        let request = self
            .client
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [row] }));

        self.send(request).await?;

        Ok(())
    }

    async fn write_cells(&self, table: &str, cells: Vec<CellUpdate>) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }

        let count = cells.len();
        let data: Vec<RangeData> = cells
            .into_iter()
            .map(|cell| RangeData {
                range: cell_range(table, cell.row, cell.column),
                values: vec![vec![cell.value]],
            })
            .collect();

        let request = self
            .client
            .post(self.batch_url())
            .json(&json!({ "valueInputOption": "RAW", "data": data }));

        self.send(request).await?;
        debug!("Batch updated {count} cells in {table}");

        Ok(())
    }

    async fn write_table(&self, table: &str, contents: &Table) -> Result<()> {
        let width = contents
            .rows
            .iter()
            .map(Vec::len)
            .chain([contents.headers.len()])
            .max()
            .unwrap_or(1)
            .max(1);
        let range = format!(
            "{table}!A1:{}{}",
            column_letter(width),
            contents.len() + 1
        );

        let request = self
            .client
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": contents.to_values() }));

        self.send(request).await?;

        Ok(())
    }
}

/// 1 → A, 26 → Z, 27 → AA.
pub fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();

    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }

    letters.iter().rev().collect()
}

pub fn read_range(table: &str) -> String {
    format!("{table}!A1:{LAST_READ_COLUMN}")
}

/// Full-width range of data row `index`.
pub fn row_range(table: &str, index: usize, width: usize) -> String {
    let row = index + 2;

    format!("{table}!A{row}:{}{row}", column_letter(width.max(1)))
}

/// Single cell of data row `index`, 0-based `column`.
pub fn cell_range(table: &str, index: usize, column: usize) -> String {
    format!("{table}!{}{}", column_letter(column + 1), index + 2)
}

fn table_from_values(values: Vec<Vec<Value>>) -> Table {
    Table::from_values(
        values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect(),
    )
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    StoreError::Sheets {
        status: status.as_u16(),
        message,
    }
}
