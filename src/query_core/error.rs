//! Error kinds surfaced by the query engine
//!
//! Validation errors are client mistakes (HTTP 400); everything else is a
//! server-side failure (HTTP 500). The message is sent verbatim in the
//! `{"error": ...}` response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    InvalidTimestamp(String),

    #[error("{0}")]
    InvalidLimit(String),

    #[error("{0}")]
    InvalidScale(String),

    #[error("{0}")]
    InvalidAssetId(String),

    #[error("{0}")]
    StorageUnavailable(String),

    #[error("{0}")]
    UnexpectedFailure(String),
}

impl QueryError {
    pub fn status(&self) -> StatusCode {
        match self {
            QueryError::InvalidTimestamp(_)
            | QueryError::InvalidLimit(_)
            | QueryError::InvalidScale(_)
            | QueryError::InvalidAssetId(_) => StatusCode::BAD_REQUEST,
            QueryError::StorageUnavailable(_) | QueryError::UnexpectedFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        QueryError::StorageUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for QueryError {
    fn from(err: tokio::task::JoinError) -> Self {
        QueryError::UnexpectedFailure(format!("storage worker failed: {}", err))
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
