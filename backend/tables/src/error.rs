use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table {0} not found")]
    TableNotFound(String),

    #[error("Table {0} has no header row")]
    MissingHeader(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Row {index} out of range for table {table}")]
    RowOutOfRange { table: String, index: usize },

    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Sheets API error ({status}): {message}")]
    Sheets { status: u16, message: String },
}
