//! Chunked component persistence over a size-constrained key/value medium.
//!
//! The collection is split into fixed-size chunks stored under
//! `<prefix>chunk_<n>`, indexed by a `<prefix>metadata` record. Media
//! implement [`partdb_core::traits::KeyValueStore`]; [`MemoryStore`] mirrors
//! browser storage for tests and [`FileStore`] persists to a directory.
pub mod chunked;
pub mod error;
pub mod file;
pub mod memory;
pub mod stats;

pub use chunked::{ComponentStore, StorageMetadata, StoreOptions, CHUNK_SIZE, STORAGE_PREFIX};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::{MemoryStore, DEFAULT_QUOTA_BYTES};
pub use stats::{format_bytes, StorageStats};
