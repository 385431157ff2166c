//! Response types for the image relay

use chrono::{DateTime, Utc};
use expiring_blob_store::{BlobEntry, StoreStats, Token};
use serde::{Deserialize, Serialize};

/// Cache lifetime for images that never expire (one year)
pub const IMMUTABLE_MAX_AGE_SECS: u64 = 31_536_000;

/// Body returned for every successful upload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub id: Token,
    /// Direct image URL: the backend's public copy if it has one
    pub url: String,
    pub view_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UploadResponse {
    pub fn for_entry(entry: &BlobEntry, public_url: &str, extension: &str) -> Self {
        let url = entry
            .public_url()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/images/{}.{}", public_url, entry.token, extension));

        Self {
            success: true,
            id: entry.token.clone(),
            url,
            view_url: format!("{}/view/{}", public_url, entry.token),
            expires_at: entry.expires_at,
        }
    }
}

/// Query parameters accepted by the upload endpoint
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Requested lifetime in seconds
    pub ttl: Option<u64>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub backend: String,
    pub store: StoreStats,
}
