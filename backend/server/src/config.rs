use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use tables::remote::SHEETS_API;
use tracing::{info, warn};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Csv,
    Sheets,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Backend::Csv),
            "sheets" => Ok(Backend::Sheets),
            other => Err(format!("unknown storage backend '{other}', expected csv or sheets")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub image_dir: PathBuf,
    pub spreadsheet_id: Option<String>,
    pub credentials_path: PathBuf,
    pub sheets_api_url: String,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            port: try_load(&source, "RUST_PORT", "7777")?,
            backend: try_load(&source, "STORAGE_BACKEND", "csv")?,
            data_dir: try_load(&source, "DATA_DIR", "data")?,
            image_dir: try_load(&source, "IMAGE_DIR", "images")?,
            spreadsheet_id: source("GOOGLE_SHEETS_SPREADSHEET_ID")
                .or_else(|| read_secret("GOOGLE_SHEETS_SPREADSHEET_ID")),
            credentials_path: try_load(&source, "GOOGLE_CREDENTIALS_PATH", "credentials.json")?,
            sheets_api_url: try_load(&source, "GOOGLE_SHEETS_API_URL", SHEETS_API)?,
        })
    }
}

fn try_load<T: FromStr>(
    source: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, AppError>
where
    T::Err: Display,
{
    source(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::Config(format!("invalid {key}: {e}"))
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
}
