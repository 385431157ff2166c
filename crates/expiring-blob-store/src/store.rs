//! In-memory blob map with per-entry expiry timers

use crate::backend::{MemoryBackend, StorageBackend};
use crate::error::{Result, StoreError};
use crate::token::Token;
use crate::types::{BlobEntry, Placement, StoreStats};
use bytes::Bytes;
use chrono::Utc;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Number of locks that serialize backend writes and discards per token
const MIRROR_STRIPES: usize = 16;

/// A map slot: the entry plus the bookkeeping for its expiry timer
struct Slot {
    entry: BlobEntry,
    /// Ties the expiry timer to this exact insert
    generation: u64,
    deadline: Option<Instant>,
    expiry: Option<AbortHandle>,
}

impl Slot {
    /// Past the deadline. A zero TTL stays readable until the clock moves.
    fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() > deadline)
    }

    fn cancel_expiry(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.abort();
        }
    }
}

struct Shared {
    entries: RwLock<HashMap<Token, Slot>>,
    backend: Arc<dyn StorageBackend>,
    /// Held across persist+insert and across liveness check+discard
    mirror_locks: Box<[Mutex<()>]>,
    next_generation: AtomicU64,
    current_size: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Shared {
    /// Remove `token` if it still holds the entry armed as `generation`
    async fn expire(&self, token: &Token, generation: u64) -> bool {
        let removed = {
            let mut entries = self.entries.write().await;
            let current = entries.get(token).map(|slot| slot.generation);
            if current == Some(generation) {
                entries.remove(token)
            } else {
                None
            }
        };

        match removed {
            Some(slot) => {
                self.current_size.fetch_sub(slot.entry.size(), Ordering::Relaxed);
                debug!(token = %token, "Blob expired");
                self.discard(token, slot.entry.placement).await;
                true
            }
            None => {
                debug!(token = %token, generation, "Expiry fired for a replaced or deleted entry");
                false
            }
        }
    }

    fn mirror_lock(&self, token: &Token) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        &self.mirror_locks[hasher.finish() as usize % self.mirror_locks.len()]
    }

    /// Drop a backend copy unless a live entry for `token` has since been
    /// persisted to the same placement (disk paths are reused per token)
    async fn discard(&self, token: &Token, placement: Option<Placement>) {
        let Some(placement) = placement else {
            return;
        };

        let _guard = self.mirror_lock(token).lock().await;
        let reused = self
            .entries
            .read()
            .await
            .get(token)
            .is_some_and(|slot| slot.entry.placement.as_ref() == Some(&placement));
        if reused {
            debug!(token = %token, key = %placement.key, "Backend copy belongs to a newer entry");
            return;
        }

        if let Err(e) = self.backend.discard(&placement).await {
            warn!(
                token = %token,
                backend = self.backend.name(),
                key = %placement.key,
                error = %e,
                "Failed to discard backend copy"
            );
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        for slot in self.entries.get_mut().values_mut() {
            slot.cancel_expiry();
        }
    }
}

/// Token-keyed blob store with optional per-entry TTL.
///
/// All lookups are served from the in-memory map; the backend only mirrors
/// the content. Dropping the store cancels every pending expiry timer.
pub struct BlobStore {
    shared: Arc<Shared>,
}

impl BlobStore {
    /// Create a store that keeps blobs in memory only
    pub fn new() -> Self {
        Self::with_backend(Arc::new(MemoryBackend))
    }

    /// Create a store that mirrors every blob to `backend`
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(HashMap::new()),
                backend,
                mirror_locks: (0..MIRROR_STRIPES).map(|_| Mutex::new(())).collect(),
                next_generation: AtomicU64::new(0),
                current_size: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.shared.backend.name()
    }

    /// Store `content` under `token`, replacing any existing entry.
    ///
    /// With a `ttl` the entry is removed once it elapses. A pending expiry
    /// for the same token is cancelled before the new one is armed. Nothing
    /// is stored if the backend fails.
    pub async fn put(
        &self,
        token: Token,
        content: impl Into<Bytes>,
        ttl: Option<Duration>,
    ) -> Result<BlobEntry> {
        let content = content.into();
        if content.is_empty() {
            return Err(StoreError::InvalidInput("content is empty".to_string()));
        }

        let mirror_guard = self.shared.mirror_lock(&token).lock().await;
        let placement = self.shared.backend.persist(&token, &content).await?;

        let created_at = Utc::now();
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| created_at.checked_add_signed(ttl));
        let deadline = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);

        let entry = BlobEntry {
            token: token.clone(),
            content,
            created_at,
            expires_at,
            placement,
        };
        let size = entry.size();

        let replaced = {
            let mut entries = self.shared.entries.write().await;

            let mut previous = entries.remove(&token);
            if let Some(prev) = previous.as_mut() {
                prev.cancel_expiry();
                self.shared
                    .current_size
                    .fetch_sub(prev.entry.size(), Ordering::Relaxed);
            }

            let expiry =
                deadline.map(|deadline| self.arm_expiry(token.clone(), generation, deadline));
            entries.insert(
                token.clone(),
                Slot {
                    entry: entry.clone(),
                    generation,
                    deadline,
                    expiry,
                },
            );
            self.shared.current_size.fetch_add(size, Ordering::Relaxed);

            previous
        };
        drop(mirror_guard);

        if let Some(prev) = replaced {
            debug!(token = %token, "Replaced existing blob");
            if prev.entry.placement != entry.placement {
                let shared = Arc::clone(&self.shared);
                let token = token.clone();
                tokio::spawn(async move {
                    shared.discard(&token, prev.entry.placement).await;
                });
            }
        }

        debug!(token = %token, size, ttl_secs = ttl.map(|t| t.as_secs()), "Stored blob");
        Ok(entry)
    }

    /// Spawn the one-shot timer that sweeps `token` at `deadline`
    fn arm_expiry(&self, token: Token, generation: u64, deadline: Instant) -> AbortHandle {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire(&token, generation).await;
            }
        })
        .abort_handle()
    }

    /// Content stored under `token`, if any and not yet expired
    pub async fn get(&self, token: &Token) -> Option<Bytes> {
        self.entry(token).await.map(|entry| entry.content)
    }

    /// Full entry stored under `token`, if any and not yet expired
    pub async fn entry(&self, token: &Token) -> Option<BlobEntry> {
        let found = {
            let entries = self.shared.entries.read().await;
            entries
                .get(token)
                .filter(|slot| !slot.is_expired())
                .map(|slot| slot.entry.clone())
        };

        if found.is_some() {
            self.shared.hits.fetch_add(1, Ordering::Relaxed);
            debug!(token = %token, "Blob hit");
        } else {
            self.shared.misses.fetch_add(1, Ordering::Relaxed);
            debug!(token = %token, "Blob miss");
        }
        found
    }

    /// Remove `token` and cancel its expiry. Returns whether an entry was
    /// present; deleting an absent token is a no-op.
    pub async fn delete(&self, token: &Token) -> bool {
        let removed = {
            let mut entries = self.shared.entries.write().await;
            entries.remove(token).map(|mut slot| {
                slot.cancel_expiry();
                self.shared
                    .current_size
                    .fetch_sub(slot.entry.size(), Ordering::Relaxed);
                slot
            })
        };

        match removed {
            Some(slot) => {
                debug!(token = %token, "Deleted blob");
                self.shared.discard(token, slot.entry.placement).await;
                true
            }
            None => false,
        }
    }

    /// Remove every entry, cancelling timers and discarding backend copies
    pub async fn purge(&self) -> usize {
        let drained: Vec<(Token, Slot)> = {
            let mut entries = self.shared.entries.write().await;
            self.shared.current_size.store(0, Ordering::Relaxed);
            entries
                .drain()
                .map(|(token, mut slot)| {
                    slot.cancel_expiry();
                    (token, slot)
                })
                .collect()
        };

        let count = drained.len();
        for (token, slot) in drained {
            self.shared.discard(&token, slot.entry.placement).await;
        }

        info!(count, backend = self.backend_name(), "Purged blob store");
        count
    }

    /// Get current store statistics
    pub async fn stats(&self) -> StoreStats {
        let entries = self.shared.entries.read().await;
        StoreStats {
            entries: entries.len(),
            total_size: self.shared.current_size.load(Ordering::Relaxed),
            hits: self.shared.hits.load(Ordering::Relaxed),
            misses: self.shared.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::new()
    }
}
