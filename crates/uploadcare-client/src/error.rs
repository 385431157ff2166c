//! Error types for the Uploadcare client

use std::fmt;

/// Errors that can occur when talking to Uploadcare
#[derive(Debug)]
pub enum UploadcareError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Failed to parse JSON response
    Json(serde_json::Error),
    /// Uploadcare answered with a non-success status
    Api { status: u16, body: String },
    /// Deleting files requires the secret key
    MissingSecretKey,
}

impl fmt::Display for UploadcareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Uploadcare HTTP error: {}", e),
            Self::Json(e) => write!(f, "Uploadcare JSON parse error: {}", e),
            Self::Api { status, body } => {
                write!(f, "Uploadcare returned status {}: {}", status, body)
            }
            Self::MissingSecretKey => write!(f, "Uploadcare secret key is not configured"),
        }
    }
}

impl std::error::Error for UploadcareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UploadcareError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for UploadcareError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for Uploadcare operations
pub type Result<T> = std::result::Result<T, UploadcareError>;
