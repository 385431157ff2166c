//! Token-keyed blob store with TTL expiry
//!
//! Holds binary blobs in memory keyed by an opaque random [`Token`], with an
//! optional per-entry time-to-live. Each entry with a TTL gets its own
//! cancellable expiry timer. Blobs can additionally be mirrored to a
//! [`StorageBackend`] (local directory, remote provider), which is told to
//! discard its copy whenever the entry goes away.

pub mod backend;
pub mod error;
mod store;
pub mod token;
mod types;

pub use backend::{DiskBackend, MemoryBackend, StorageBackend};
pub use error::{Result, StoreError};
pub use store::BlobStore;
pub use token::Token;
pub use types::{BlobEntry, Placement, StoreStats};
