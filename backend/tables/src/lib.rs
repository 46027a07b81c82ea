//! # Tables
//!
//! Flat tabular storage shared by the server and the maintenance CLI.
//!
//! Every record lives in a named table. A table is either a CSV file in the data directory
//! (`<dir>/<table>.csv`) or a tab of the same name in a Google spreadsheet. Both backends
//! speak the [`Store`] trait, so handlers never know which one they talk to.
//!
//! ## Indexing
//!
//! - Data rows are 0-indexed and the header is not counted
//! - On a sheet, data row `i` lives on row `i + 2` (1-indexed, row 1 is the header)
//! - The first column of a table holds the record id
//!
//! ## Consistency
//!
//! There are no transactions. The CSV backend serializes its own read-modify-write cycles,
//! the sheet backend does not. Concurrent writers race and the last write wins.
use async_trait::async_trait;
use uuid::Uuid;

pub mod auth;
pub mod error;
pub mod local;
pub mod models;
pub mod remote;
pub mod repository;
pub mod table;

pub use error::StoreError;
pub use local::CsvStore;
pub use models::Record;
pub use remote::SheetsStore;
pub use table::Table;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Single cell write, addressed by data row index and header column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs.
    fn kind(&self) -> &'static str;

    /// Create the table with the given header when it does not exist yet.
    async fn ensure_table(&self, table: &str, columns: &[&str]) -> Result<()>;

    async fn read_table(&self, table: &str) -> Result<Table>;

    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()>;

    /// Overwrite data row `index` in place.
    async fn write_row(&self, table: &str, index: usize, row: Vec<String>) -> Result<()>;

    /// Batch write of single cells. An empty batch is a no-op.
    async fn write_cells(&self, table: &str, cells: Vec<CellUpdate>) -> Result<()>;

    /// Replace header and every data row.
    async fn write_table(&self, table: &str, contents: &Table) -> Result<()>;
}

/// Identifier for records created through the API.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Short identifier used when patching rows that were typed in by hand.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);

    id
}
