//! # Table Maintenance
//!
//! One-off jobs run against whichever store the server is configured for.
//!
//! ## Fill IDs
//! Rows typed straight into a sheet or CSV usually lack an id. Every row with content and an
//! empty first cell gets the first 8 hex characters of a UUID v4, written back in one batch.
//! Fully empty rows are left alone.
//!
//! ## Rebase
//! Card and media paths are absolute URLs pointing at the image server, for example
//! `http://localhost:7777/images/bee.png`. When the server moves, rewrite the prefix of every
//! cell in the column:
//! ```sh
//! process rebase cards image_path http://localhost:7777 https://hive.example
//! process rebase media media_path http://localhost:7777 https://hive.example
//! ```
//!
//! ## Inspect
//! Quick check that the configured store is reachable and the header is what we expect.
use std::sync::Arc;

use tables::{Store, repository};

pub mod utils;

use utils::{normalize_origin, progress_bar, row_as_json};

/// Tables that historically get rows added by hand.
pub const DEFAULT_FILL_TABLES: [&str; 2] = ["media", "media_entries"];

pub async fn open_store() -> anyhow::Result<Arc<dyn Store>> {
    let config = server::config::Config::load()?;

    Ok(server::database::init_store(&config).await?)
}

pub async fn fill_ids(store: &dyn Store, tables: &[String]) -> anyhow::Result<usize> {
    let pb = progress_bar(tables.len() as u64);
    let mut total = 0;

    for table in tables {
        pb.set_message(format!("Updating {table}"));

        let updated = repository::fill_missing_ids(store, table).await?;
        total += updated;

        pb.println(format!("{table}: {updated} new IDs"));
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Total New IDs: {total}");

    Ok(total)
}

pub async fn rebase(
    store: &dyn Store,
    table: &str,
    column: &str,
    from: &str,
    to: &str,
) -> anyhow::Result<usize> {
    let from = normalize_origin(from);
    let to = normalize_origin(to);

    if from.is_empty() {
        anyhow::bail!("refusing to rebase from an empty prefix");
    }

    let changed = repository::rewrite_prefix(store, table, column, &from, &to).await?;

    if changed == 0 {
        println!("No {column} values start with {from}. Exiting.");
    } else {
        println!("Rewrote {changed} {column} values: {from} -> {to}");
    }

    Ok(changed)
}

pub async fn inspect(store: &dyn Store, table: &str) -> anyhow::Result<()> {
    let contents = store.read_table(table).await?;

    println!("Store: {}", store.kind());
    println!("Columns: {}", contents.headers.join(", "));
    println!("Found {} {table} rows", contents.len());

    if !contents.is_empty() {
        println!("\nFirst row:");
        println!("{}", serde_json::to_string_pretty(&row_as_json(&contents, 0))?);
    }

    #[cfg(feature = "verbose")]
    for index in 1..contents.len() {
        println!("{}", row_as_json(&contents, index));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tables::{CsvStore, Record, models::Card};
    use tempfile::tempdir;

    use super::*;

    async fn cards_store(dir: &std::path::Path) -> CsvStore {
        let store = CsvStore::open(dir).await.unwrap();
        store.ensure_table(Card::TABLE, Card::COLUMNS).await.unwrap();

        for row in [
            ["c1", "http://localhost:7777/images/bee.png"],
            ["", "http://localhost:7777/images/wasp.png"],
            ["c3", "/images/local.png"],
        ] {
            store
                .append_row(Card::TABLE, row.iter().map(|c| c.to_string()).collect())
                .await
                .unwrap();
        }

        store
    }

    #[tokio::test]
    async fn test_fill_ids_counts_across_tables() {
        let dir = tempdir().unwrap();
        let store = cards_store(dir.path()).await;

        let total = fill_ids(&store, &["cards".to_string()]).await.unwrap();

        assert_eq!(total, 1);
        let table = store.read_table("cards").await.unwrap();
        assert_eq!(table.missing_ids(), Vec::<usize>::new());
    }

    #[tokio::test]
    async fn test_rebase_ignores_trailing_slash() {
        let dir = tempdir().unwrap();
        let store = cards_store(dir.path()).await;

        let changed = rebase(
            &store,
            "cards",
            "image_path",
            "http://localhost:7777/",
            "https://hive.example/",
        )
        .await
        .unwrap();

        assert_eq!(changed, 2);
        let table = store.read_table("cards").await.unwrap();
        assert_eq!(table.cell(0, 1), "https://hive.example/images/bee.png");
        assert_eq!(table.cell(2, 1), "/images/local.png");
    }

    #[tokio::test]
    async fn test_rebase_rejects_empty_prefix() {
        let dir = tempdir().unwrap();
        let store = cards_store(dir.path()).await;

        assert!(rebase(&store, "cards", "image_path", "/", "https://x").await.is_err());
    }

    #[tokio::test]
    async fn test_inspect_missing_table() {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        assert!(inspect(&store, "media").await.is_err());
    }
}
