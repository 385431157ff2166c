//! Storage backends that mirror stored blobs
//!
//! The in-memory map in [`BlobStore`](crate::BlobStore) is always the source
//! of truth for lookups. A backend only holds a copy: it is asked to persist
//! the bytes before an entry is committed, and to discard its copy once the
//! entry is deleted, expired, purged or overwritten.

mod disk;

pub use disk::DiskBackend;

use crate::error::Result;
use crate::token::Token;
use crate::types::Placement;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name for logs and the health endpoint
    fn name(&self) -> &'static str;

    /// Store a copy of `content`. Returning `Ok(None)` means the backend
    /// keeps nothing outside the map.
    async fn persist(&self, token: &Token, content: &Bytes) -> Result<Option<Placement>>;

    /// Drop a copy previously returned by [`persist`](Self::persist)
    async fn discard(&self, placement: &Placement) -> Result<()>;
}

/// Keeps blobs in process memory only
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackend;

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn persist(&self, _token: &Token, _content: &Bytes) -> Result<Option<Placement>> {
        Ok(None)
    }

    async fn discard(&self, _placement: &Placement) -> Result<()> {
        Ok(())
    }
}
