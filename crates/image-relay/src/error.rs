//! Error types for the image relay

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use expiring_blob_store::StoreError;
use serde_json::json;
use std::fmt;

/// Startup and configuration failures
#[derive(Debug)]
pub enum RelayError {
    Store(StoreError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Store(err) => write!(f, "Store error: {}", err),
            RelayError::Io(err) => write!(f, "IO error: {}", err),
            RelayError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Store(err) => Some(err),
            RelayError::Io(err) => Some(err.as_ref()),
            RelayError::Config(_) => None,
        }
    }
}

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self {
        RelayError::Store(err)
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for RelayError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        RelayError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// Request error that converts to a `{"error": ...}` JSON response
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Storage(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store image".into(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidInput(msg) => AppError::BadRequest(msg),
            StoreError::Storage(_) | StoreError::Io(_) => AppError::Storage(e.to_string()),
            StoreError::Entropy(_) => AppError::Internal(e.to_string()),
        }
    }
}
