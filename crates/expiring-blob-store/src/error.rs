//! Error types for the blob store

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Content or token rejected before any storage was attempted
    InvalidInput(String),
    /// Backend (disk, remote provider) failed to store or discard a blob
    Storage(String),
    Io(Box<std::io::Error>),
    /// The operating system RNG could not produce a token
    Entropy(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            StoreError::Storage(msg) => write!(f, "Storage error: {}", msg),
            StoreError::Io(err) => write!(f, "IO error: {}", err),
            StoreError::Entropy(msg) => write!(f, "Entropy source failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(Box::new(err))
    }
}

impl StoreError {
    /// Whether the failure came from the storage side rather than the caller
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, StoreError::Storage(_) | StoreError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
