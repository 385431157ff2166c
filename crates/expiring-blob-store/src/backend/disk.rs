//! Directory-backed mirror, one file per token

use super::StorageBackend;
use crate::error::{Result, StoreError};
use crate::token::Token;
use crate::types::Placement;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

/// Writes each blob to `<dir>/<token>`
#[derive(Debug, Clone)]
pub struct DiskBackend {
    dir: PathBuf,
}

impl DiskBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensure the upload directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        info!(dir = ?self.dir, "Disk backend initialized");
        Ok(())
    }

    pub fn path_for(&self, token: &Token) -> PathBuf {
        self.dir.join(token.as_str())
    }
}

#[async_trait]
impl StorageBackend for DiskBackend {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn persist(&self, token: &Token, content: &Bytes) -> Result<Option<Placement>> {
        let path = self.path_for(token);
        fs::write(&path, content).await.map_err(|e| {
            StoreError::Storage(format!("failed to write {}: {}", path.display(), e))
        })?;

        debug!(path = ?path, size = content.len(), "Wrote blob to disk");
        Ok(Some(Placement::new(path.to_string_lossy())))
    }

    async fn discard(&self, placement: &Placement) -> Result<()> {
        match fs::remove_file(&placement.key).await {
            Ok(()) => {
                debug!(path = %placement.key, "Removed blob from disk");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Storage(format!(
                "failed to remove {}: {}",
                placement.key, e
            ))),
        }
    }
}
