//! Configuration and response types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for an Uploadcare project
#[derive(Debug, Clone)]
pub struct UploadcareConfig {
    pub public_key: String,
    /// Only needed for deletion
    pub secret_key: Option<String>,
    pub upload_base_url: String,
    pub api_base_url: String,
    pub cdn_base_url: String,
    pub timeout: Duration,
}

impl UploadcareConfig {
    pub const DEFAULT_UPLOAD_BASE_URL: &'static str = "https://upload.uploadcare.com";
    pub const DEFAULT_API_BASE_URL: &'static str = "https://api.uploadcare.com";
    pub const DEFAULT_CDN_BASE_URL: &'static str = "https://ucarecdn.com";

    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: None,
            upload_base_url: Self::DEFAULT_UPLOAD_BASE_URL.to_string(),
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            cdn_base_url: Self::DEFAULT_CDN_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_cdn_base_url(mut self, url: impl Into<String>) -> Self {
        self.cdn_base_url = url.into();
        self
    }

    /// Point both the upload and REST endpoints at one host (used by tests)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.upload_base_url = url.clone();
        self.api_base_url = url;
        self
    }
}

/// A file accepted by Uploadcare
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_id: String,
    pub cdn_url: String,
}

/// Body of a successful direct upload
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UploadcareConfig::new("demopublickey");
        assert_eq!(config.public_key, "demopublickey");
        assert!(config.secret_key.is_none());
        assert_eq!(config.upload_base_url, "https://upload.uploadcare.com");
        assert_eq!(config.api_base_url, "https://api.uploadcare.com");
        assert_eq!(config.cdn_base_url, "https://ucarecdn.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_with_base_url_sets_both_endpoints() {
        let config = UploadcareConfig::new("k").with_base_url("http://127.0.0.1:9000");
        assert_eq!(config.upload_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.cdn_base_url, "https://ucarecdn.com");
    }

    #[test]
    fn test_upload_response_deserialization() {
        let json = r#"{"file": "17be4678-dab7-4bc7-8753-28914a22960a"}"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.file, "17be4678-dab7-4bc7-8753-28914a22960a");
    }
}
