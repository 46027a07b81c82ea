//! # CSV
//!
//! One file per table under the data directory, header on the first line.
//!
//! Writes go through `<table>.csv.tmp` and a rename so a crashed write never leaves half a file.
//! A single mutex covers every read-modify-write cycle of the store.
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use crate::{CellUpdate, Result, Store, StoreError, Table};

pub struct CsvStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl CsvStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !fs::try_exists(&dir).await? {
            info!("Creating data directory {}", dir.display());
            fs::create_dir_all(&dir).await?;
        }

        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    async fn load(&self, table: &str) -> Result<Table> {
        let bytes = match fs::read(self.path(table)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::TableNotFound(table.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut values = Vec::new();
        for record in reader.records() {
            values.push(record?.iter().map(String::from).collect());
        }

        Ok(Table::from_values(values))
    }

    async fn save(&self, table: &str, contents: &Table) -> Result<()> {
        let width = contents.headers.len();

        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        writer.write_record(&contents.headers)?;

        for row in &contents.rows {
            let mut row = row.clone();
            if row.len() < width {
                row.resize(width, String::new());
            }
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?;

        let path = self.path(table);
        let tmp = path.with_extension("csv.tmp");

        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;

        debug!("Wrote {} rows to {}", contents.len(), path.display());

        Ok(())
    }
}

#[async_trait]
impl Store for CsvStore {
    fn kind(&self) -> &'static str {
        "csv"
    }

    async fn ensure_table(&self, table: &str, columns: &[&str]) -> Result<()> {
        let _guard = self.lock.lock().await;

        if fs::try_exists(self.path(table)).await? {
            return Ok(());
        }

        info!("Creating table {table}");
        self.save(table, &Table::new(columns)).await
    }

    async fn read_table(&self, table: &str) -> Result<Table> {
        self.load(table).await
    }

    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut contents = self.load(table).await?;
        contents.rows.push(row);

        self.save(table, &contents).await
    }

    async fn write_row(&self, table: &str, index: usize, row: Vec<String>) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut contents = self.load(table).await?;
        let slot = contents
            .rows
            .get_mut(index)
            .ok_or_else(|| StoreError::RowOutOfRange {
                table: table.to_string(),
                index,
            })?;
        *slot = row;

        self.save(table, &contents).await
    }

    async fn write_cells(&self, table: &str, cells: Vec<CellUpdate>) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().await;

        let mut contents = self.load(table).await?;
        for cell in cells {
            let row = contents
                .rows
                .get_mut(cell.row)
                .ok_or_else(|| StoreError::RowOutOfRange {
                    table: table.to_string(),
                    index: cell.row,
                })?;

            if row.len() <= cell.column {
                row.resize(cell.column + 1, String::new());
            }
            row[cell.column] = cell.value;
        }

        self.save(table, &contents).await
    }

    async fn write_table(&self, table: &str, contents: &Table) -> Result<()> {
        let _guard = self.lock.lock().await;

        self.save(table, contents).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("data");

        let store = CsvStore::open(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
    }

    #[tokio::test]
    async fn test_missing_table() {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        assert!(matches!(
            store.read_table("cards").await,
            Err(StoreError::TableNotFound(name)) if name == "cards"
        ));
    }

    #[tokio::test]
    async fn test_ensure_table_keeps_existing_rows() {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        store.ensure_table("cards", &["id", "image_path"]).await.unwrap();
        store.append_row("cards", row(&["c1", "/images/a.png"])).await.unwrap();
        store.ensure_table("cards", &["id", "image_path"]).await.unwrap();

        let table = store.read_table("cards").await.unwrap();
        assert_eq!(table.headers, row(&["id", "image_path"]));
        assert_eq!(table.rows, vec![row(&["c1", "/images/a.png"])]);
    }

    #[tokio::test]
    async fn test_quoted_cells_survive() {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        store.ensure_table("entries", &["id", "entry_text"]).await.unwrap();
        store
            .append_row("entries", row(&["e1", "bees, honey and \"wax\"\nnew line"]))
            .await
            .unwrap();

        let table = store.read_table("entries").await.unwrap();
        assert_eq!(table.cell(0, 1), "bees, honey and \"wax\"\nnew line");
    }

    #[tokio::test]
    async fn test_write_row_and_cells() {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        store.ensure_table("media", &["id", "text"]).await.unwrap();
        store.append_row("media", row(&["", "one"])).await.unwrap();
        store.append_row("media", row(&["m2", "two"])).await.unwrap();

        store.write_row("media", 1, row(&["m2", "deux"])).await.unwrap();
        store
            .write_cells(
                "media",
                vec![CellUpdate {
                    row: 0,
                    column: 0,
                    value: "m1".into(),
                }],
            )
            .await
            .unwrap();

        let table = store.read_table("media").await.unwrap();
        assert_eq!(table.rows, vec![row(&["m1", "one"]), row(&["m2", "deux"])]);
    }

    #[tokio::test]
    async fn test_write_row_out_of_range() {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        store.ensure_table("media", &["id"]).await.unwrap();

        assert!(matches!(
            store.write_row("media", 3, row(&["x"])).await,
            Err(StoreError::RowOutOfRange { index: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_short_rows_are_padded_on_save() {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        let mut table = Table::new(&["id", "name", "email"]);
        table.rows.push(row(&["u1"]));
        store.write_table("users", &table).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("users.csv")).unwrap();
        assert_eq!(raw, "id,name,email\nu1,,\n");
    }
}
