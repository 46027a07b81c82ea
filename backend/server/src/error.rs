use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tables::StoreError;
use thiserror::Error;
use tracing::error;

const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::UnknownColumn(_)) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store and config details stay in the log.
        let message = if status.is_server_error() {
            error!("{self}");
            INTERNAL_ERROR.to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": message,
                "status_code": status.as_u16(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_of(err: AppError) -> Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_statuses() {
        assert_eq!(
            AppError::MalformedPayload("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("Game".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Store(StoreError::UnknownColumn("colour".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Store(StoreError::TableNotFound("cards".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            AppError::NotFound("Resource".into()).to_string(),
            "Resource not found"
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let io = StoreError::Io(std::io::Error::other("/srv/hive/data/users.csv: disk full"));

        assert_eq!(
            body_of(AppError::Store(io)).await,
            json!({ "error": "Internal server error", "status_code": 500 })
        );
        assert_eq!(
            body_of(AppError::Config("bad key".into())).await["error"],
            "Internal server error"
        );
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        assert_eq!(
            body_of(AppError::NotFound("Game g1".into())).await,
            json!({ "error": "Game g1 not found", "status_code": 404 })
        );
    }
}
