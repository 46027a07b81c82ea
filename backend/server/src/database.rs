//! # Storage
//!
//! Picks the table backend from [`Config::backend`].
//!
//! ## CSV
//! - One file per table under `DATA_DIR`
//! - Missing files are created with their header on startup
//!
//! ## Sheets
//! - One tab per table in the spreadsheet `GOOGLE_SHEETS_SPREADSHEET_ID`
//! - Service-account key at `GOOGLE_CREDENTIALS_PATH`
//! - Requests go to `GOOGLE_SHEETS_API_URL`, the public Sheets v4 API unless overridden
//! - Tabs must already exist. An empty tab gets its header row on the first insert
use std::sync::Arc;

use tables::{
    CsvStore, Record, SheetsStore, Store, StoreError,
    models::{Card, Deck, DeckCard, Entry, Game, Media, MediaEntry, SoloPostcard, User},
};
use tracing::info;

use crate::{
    config::{Backend, Config},
    error::AppError,
};

pub async fn init_store(config: &Config) -> Result<Arc<dyn Store>, AppError> {
    let store: Arc<dyn Store> = match config.backend {
        Backend::Csv => Arc::new(CsvStore::open(&config.data_dir).await?),
        Backend::Sheets => {
            let spreadsheet_id = config.spreadsheet_id.as_deref().ok_or_else(|| {
                AppError::Config(
                    "GOOGLE_SHEETS_SPREADSHEET_ID is required for the sheets backend".into(),
                )
            })?;

            let store = SheetsStore::connect(spreadsheet_id, &config.credentials_path)
                .await?
                .with_base_url(&config.sheets_api_url);

            Arc::new(store)
        }
    };

    ensure_tables(store.as_ref()).await?;
    info!("Using {} storage", store.kind());

    Ok(store)
}

pub async fn ensure_tables(store: &dyn Store) -> Result<(), StoreError> {
    ensure::<User>(store).await?;
    ensure::<Deck>(store).await?;
    ensure::<Card>(store).await?;
    ensure::<Game>(store).await?;
    ensure::<Entry>(store).await?;
    ensure::<DeckCard>(store).await?;
    ensure::<SoloPostcard>(store).await?;
    ensure::<Media>(store).await?;
    ensure::<MediaEntry>(store).await
}

async fn ensure<R: Record>(store: &dyn Store) -> Result<(), StoreError> {
    store.ensure_table(R::TABLE, R::COLUMNS).await
}
