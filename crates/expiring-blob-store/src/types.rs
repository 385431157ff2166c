//! Store types

use crate::token::Token;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a backend mirrored a blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Backend-specific handle (file path, remote file id)
    pub key: String,
    /// Publicly reachable URL for the copy, if the backend serves one
    pub public_url: Option<String>,
}

impl Placement {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            public_url: None,
        }
    }

    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into());
        self
    }
}

/// A stored blob. Entries are never mutated; overwriting a token replaces
/// the whole entry.
#[derive(Debug, Clone)]
pub struct BlobEntry {
    pub token: Token,
    pub content: Bytes,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub placement: Option<Placement>,
}

impl BlobEntry {
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Whole seconds left before expiry, `None` for entries without a TTL
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<u64> {
        self.expires_at
            .map(|at| (at - now).num_seconds().max(0) as u64)
    }

    pub fn public_url(&self) -> Option<&str> {
        self.placement.as_ref().and_then(|p| p.public_url.as_deref())
    }
}

/// Statistics about the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub entries: usize,
    pub total_size: u64,
    pub hits: u64,
    pub misses: u64,
}
