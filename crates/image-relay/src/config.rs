use crate::error::{RelayError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where uploaded images are mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Disk,
    Uploadcare,
}

impl FromStr for StorageKind {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "disk" => Ok(Self::Disk),
            "uploadcare" => Ok(Self::Uploadcare),
            other => Err(RelayError::Config(format!(
                "unknown STORAGE_BACKEND {:?} (expected memory, disk or uploadcare)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadcareSettings {
    pub public_key: String,
    pub secret_key: Option<String>,
    pub cdn_base_url: Option<String>,
}

/// Relay configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub storage: StorageKind,
    pub upload_dir: PathBuf,
    /// Applied when an upload does not ask for a TTL; `None` keeps blobs
    /// until they are deleted
    pub default_ttl: Option<Duration>,
    pub max_ttl: Duration,
    pub max_upload_bytes: usize,
    /// Prefix for URLs returned to clients, empty for relative paths
    pub public_url: String,
    pub static_dir: Option<PathBuf>,
    pub uploadcare: Option<UploadcareSettings>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            storage: StorageKind::Memory,
            upload_dir: PathBuf::from("./uploads"),
            default_ttl: Some(Duration::from_secs(5 * 60)),
            max_ttl: Duration::from_secs(24 * 60 * 60),
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
            public_url: String::new(),
            static_dir: None,
            uploadcare: None,
        }
    }
}

impl RelayConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Parse configuration from any variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let number = |key: &str| var(key).and_then(|s| s.trim().parse::<u64>().ok());

        let port = var("PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let storage = match var("STORAGE_BACKEND") {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => defaults.storage,
        };

        let upload_dir = var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        // 0 disables expiry
        let default_ttl = match number("BLOB_TTL_SECS") {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.default_ttl,
        };

        let max_ttl = number("MAX_TTL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.max_ttl);

        let max_upload_bytes = number("MAX_UPLOAD_BYTES")
            .map(|n| n as usize)
            .unwrap_or(defaults.max_upload_bytes);

        let public_url = var("PUBLIC_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();

        let static_dir = var("STATIC_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let non_empty = |key: &str| var(key).filter(|s| !s.trim().is_empty());
        let uploadcare = non_empty("UPLOADCARE_PUBLIC_KEY").map(|public_key| UploadcareSettings {
            public_key,
            secret_key: non_empty("UPLOADCARE_SECRET_KEY"),
            cdn_base_url: non_empty("UPLOADCARE_CDN_BASE"),
        });

        if storage == StorageKind::Uploadcare && uploadcare.is_none() {
            return Err(RelayError::Config(
                "STORAGE_BACKEND=uploadcare requires UPLOADCARE_PUBLIC_KEY".to_string(),
            ));
        }

        Ok(Self {
            port,
            storage,
            upload_dir,
            default_ttl,
            max_ttl,
            max_upload_bytes,
            public_url,
            static_dir,
            uploadcare,
        })
    }
}
