//! Record-level operations on top of any [`Store`].
use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::{CellUpdate, Record, Result, Store, Table, short_id};

const ID_COLUMN: &str = "id";

pub async fn list<R: Record>(store: &dyn Store) -> Result<Vec<R>> {
    store.read_table(R::TABLE).await?.records()
}

pub async fn find<R: Record>(store: &dyn Store, id: &str) -> Result<Option<R>> {
    let table = store.read_table(R::TABLE).await?;

    table
        .position(ID_COLUMN, id)
        .map(|index| table.record_at(index))
        .transpose()
}

/// Every record whose `column` equals `value`.
pub async fn filter<R: Record>(store: &dyn Store, column: &str, value: &str) -> Result<Vec<R>> {
    let table = store.read_table(R::TABLE).await?;

    let Some(column) = table.column(column) else {
        return Ok(Vec::new());
    };

    (0..table.len())
        .filter(|&row| !table.is_blank(row) && table.cell(row, column) == value)
        .map(|row| table.record_at(row))
        .collect()
}

pub async fn insert<R: Record>(store: &dyn Store, record: &R) -> Result<()> {
    store.ensure_table(R::TABLE, R::COLUMNS).await?;

    let table = store.read_table(R::TABLE).await?;

    // An empty file or a bare tab has no header yet, write it along with the row.
    if !table.has_header() {
        let mut fresh = Table::new(R::COLUMNS);
        let row = fresh.row_from(record)?;
        fresh.rows.push(row);

        info!("Writing missing header for {}", R::TABLE);
        return store.write_table(R::TABLE, &fresh).await;
    }

    let row = table.row_from(record)?;
    store.append_row(R::TABLE, row).await
}

/// Patch named columns of the row with this id. `None` when no row matches.
pub async fn update<R: Record>(
    store: &dyn Store,
    id: &str,
    updates: &BTreeMap<String, String>,
) -> Result<Option<R>> {
    let mut table = store.read_table(R::TABLE).await?;

    let Some(index) = table.position(ID_COLUMN, id) else {
        return Ok(None);
    };

    let row = table.patch(index, updates)?;
    store.write_row(R::TABLE, index, row).await?;
    debug!("Updated {} row {index}", R::TABLE);

    table.record_at(index).map(Some)
}

/// Give every hand-typed row without an id a short one, in a single batch write.
pub async fn fill_missing_ids(store: &dyn Store, table: &str) -> Result<usize> {
    let contents = store.read_table(table).await?;

    let cells: Vec<CellUpdate> = contents
        .missing_ids()
        .into_iter()
        .map(|row| CellUpdate {
            row,
            column: 0,
            value: short_id(),
        })
        .collect();

    let count = cells.len();
    store.write_cells(table, cells).await?;

    if count > 0 {
        info!("Updated {count} rows with new IDs in {table}");
    }

    Ok(count)
}

/// Swap a URL prefix in one column, writing the table back only when something changed.
pub async fn rewrite_prefix(
    store: &dyn Store,
    table: &str,
    column: &str,
    from: &str,
    to: &str,
) -> Result<usize> {
    let mut contents = store.read_table(table).await?;

    let changed = contents.rewrite_prefix(column, from, to)?;
    if changed > 0 {
        store.write_table(table, &contents).await?;
        info!("Rewrote {changed} {column} cells in {table}");
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::{
        CsvStore, StoreError,
        models::{Card, Entry, Media, User},
    };

    async fn store() -> (TempDir, CsvStore) {
        let dir = tempdir().unwrap();
        let store = CsvStore::open(dir.path()).await.unwrap();

        (dir, store)
    }

    fn media(id: &str, name: &str) -> Media {
        Media {
            id: id.into(),
            order: "1".into(),
            media_name: name.into(),
            media_path: format!("http://localhost:7777/images/{name}.png"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_creates_table() {
        let (_dir, store) = store().await;

        insert(&store, &media("m1", "bee")).await.unwrap();
        insert(&store, &media("m2", "hive")).await.unwrap();

        let all: Vec<Media> = list(&store).await.unwrap();
        assert_eq!(all, vec![media("m1", "bee"), media("m2", "hive")]);
    }

    #[tokio::test]
    async fn test_insert_into_headerless_file() {
        let (dir, store) = store().await;
        std::fs::write(dir.path().join("users.csv"), "").unwrap();

        let user = User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "a@x".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        insert(&store, &user).await.unwrap();

        let table = store.read_table("users").await.unwrap();
        assert_eq!(table.headers, User::COLUMNS);
        assert_eq!(list::<User>(&store).await.unwrap(), vec![user.clone()]);
        assert_eq!(find::<User>(&store, "u1").await.unwrap(), Some(user));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_keep_every_row() {
        let (_dir, store) = store().await;
        let store = Arc::new(store);

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    insert(store.as_ref(), &media(&format!("m{i}"), "bee")).await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut ids: Vec<String> = list::<Media>(store.as_ref())
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn test_find() {
        let (_dir, store) = store().await;
        insert(&store, &media("m1", "bee")).await.unwrap();

        assert_eq!(
            find::<Media>(&store, "m1").await.unwrap(),
            Some(media("m1", "bee"))
        );
        assert_eq!(find::<Media>(&store, "m9").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filter_by_column() {
        let (_dir, store) = store().await;

        for (id, game) in [("e1", "g1"), ("e2", "g2"), ("e3", "g1")] {
            let entry = Entry {
                id: id.into(),
                game_id: game.into(),
                ..Default::default()
            };
            insert(&store, &entry).await.unwrap();
        }

        let ids: Vec<String> = filter::<Entry>(&store, "game_id", "g1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec!["e1", "e3"]);
        assert!(filter::<Entry>(&store, "nope", "g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_skips_blank_rows() {
        let (_dir, store) = store().await;
        store.ensure_table("entries", Entry::COLUMNS).await.unwrap();
        store
            .append_row("entries", vec![String::new(); Entry::COLUMNS.len()])
            .await
            .unwrap();

        let entry = Entry {
            id: "e1".into(),
            ..Default::default()
        };
        insert(&store, &entry).await.unwrap();

        let matched: Vec<Entry> = filter(&store, "game_id", "").await.unwrap();
        assert_eq!(matched, vec![entry]);
    }

    #[tokio::test]
    async fn test_update_only_touches_named_columns() {
        let (_dir, store) = store().await;
        insert(&store, &media("m1", "bee")).await.unwrap();
        insert(&store, &media("m2", "hive")).await.unwrap();

        let updates = BTreeMap::from([("text".to_string(), "buzz".to_string())]);
        let updated: Media = update(&store, "m2", &updates).await.unwrap().unwrap();

        assert_eq!(updated.text, "buzz");
        assert_eq!(updated.media_name, "hive");
        assert_eq!(find::<Media>(&store, "m1").await.unwrap(), Some(media("m1", "bee")));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let (_dir, store) = store().await;
        insert(&store, &media("m1", "bee")).await.unwrap();

        let updates = BTreeMap::from([("text".to_string(), "buzz".to_string())]);

        assert_eq!(update::<Media>(&store, "m9", &updates).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_unknown_column() {
        let (_dir, store) = store().await;
        insert(&store, &media("m1", "bee")).await.unwrap();

        let updates = BTreeMap::from([("colour".to_string(), "gold".to_string())]);

        assert!(matches!(
            update::<Media>(&store, "m1", &updates).await,
            Err(StoreError::UnknownColumn(_))
        ));
    }

    #[tokio::test]
    async fn test_fill_missing_ids() {
        let (_dir, store) = store().await;
        store.ensure_table("media", Media::COLUMNS).await.unwrap();
        store
            .append_row("media", vec!["".into(), "1".into(), "bee".into()])
            .await
            .unwrap();
        store
            .append_row("media", vec!["m2".into(), "2".into(), "hive".into()])
            .await
            .unwrap();
        store.append_row("media", vec!["".into(), "".into()]).await.unwrap();

        assert_eq!(fill_missing_ids(&store, "media").await.unwrap(), 1);
        assert_eq!(fill_missing_ids(&store, "media").await.unwrap(), 0);

        let table = store.read_table("media").await.unwrap();
        assert_eq!(table.cell(0, 0).len(), 8);
        assert_eq!(table.cell(1, 0), "m2");
        assert_eq!(table.cell(2, 0), "");
    }

    #[tokio::test]
    async fn test_rewrite_prefix() {
        let (_dir, store) = store().await;
        for id in ["c1", "c2"] {
            let card = Card {
                id: id.into(),
                image_path: format!("http://localhost:7777/images/{id}.png"),
            };
            insert(&store, &card).await.unwrap();
        }

        let changed = rewrite_prefix(
            &store,
            "cards",
            "image_path",
            "http://localhost:7777",
            "https://hive.example",
        )
        .await
        .unwrap();

        assert_eq!(changed, 2);
        let cards: Vec<Card> = list(&store).await.unwrap();
        assert_eq!(cards[1].image_path, "https://hive.example/images/c2.png");
    }
}
