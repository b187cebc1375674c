use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use partdb_core::config::StorageSettings;
use partdb_core::traits::{entry_footprint, KeyValueStore};
use partdb_core::types::Component;

use crate::error::{Result, StoreError};
use crate::memory::DEFAULT_QUOTA_BYTES;
use crate::stats::{format_bytes, StorageStats};

pub const STORAGE_PREFIX: &str = "component_db_";
pub const CHUNK_SIZE: usize = 100;
const PROBE_KEY: &str = "storage_test";
const PROBE_VALUE: &str = "test";

/// Index record describing where the chunks of the current collection live.
/// Rewritten in full on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMetadata {
    pub total_components: usize,
    pub last_updated: String,
    pub chunk_count: usize,
    pub chunk_keys: Vec<String>,
}

impl StorageMetadata {
    fn new(total_components: usize, chunk_keys: Vec<String>) -> Self {
        Self {
            total_components,
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            chunk_count: chunk_keys.len(),
            chunk_keys,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub key_prefix: String,
    pub chunk_size: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { key_prefix: STORAGE_PREFIX.to_string(), chunk_size: CHUNK_SIZE }
    }
}

impl From<&StorageSettings> for StoreOptions {
    fn from(settings: &StorageSettings) -> Self {
        Self { key_prefix: settings.key_prefix.clone(), chunk_size: settings.chunk_size.max(1) }
    }
}

impl StoreOptions {
    pub fn metadata_key(&self) -> String {
        format!("{}metadata", self.key_prefix)
    }

    pub fn chunk_key(&self, index: usize) -> String {
        format!("{}chunk_{}", self.key_prefix, index)
    }
}

/// Component collection persisted as fixed-size chunks plus a metadata record.
///
/// Every operation has a strict `try_*` form returning [`Result`] and a
/// lenient form that logs the failure and degrades to `false`, empty or
/// `None`. Saving is always a full replacement. Concurrent writers sharing a
/// medium are not coordinated; the last save wins.
pub struct ComponentStore<S: KeyValueStore> {
    medium: S,
    options: StoreOptions,
}

impl<S: KeyValueStore> ComponentStore<S> {
    pub fn new(medium: S) -> Self {
        Self::with_options(medium, StoreOptions::default())
    }

    pub fn with_options(medium: S, options: StoreOptions) -> Self {
        let chunk_size = options.chunk_size.max(1);
        Self { medium, options: StoreOptions { chunk_size, ..options } }
    }

    pub fn medium(&self) -> &S {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut S {
        &mut self.medium
    }

    /// Replace the stored collection. Returns `false` when any write failed,
    /// in which case the medium may hold a partial collection. Chunks written
    /// before the failure are not listed in any metadata, so `clear` cannot
    /// find them and they keep counting against the quota.
    pub fn save(&mut self, components: &[Component]) -> bool {
        match self.try_save(components) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, count = components.len(), "error saving component data");
                false
            }
        }
    }

    pub fn try_save(&mut self, components: &[Component]) -> Result<()> {
        self.try_clear()?;

        let mut chunk_keys = Vec::with_capacity(components.len().div_ceil(self.options.chunk_size));
        for (index, chunk) in components.chunks(self.options.chunk_size).enumerate() {
            let key = self.options.chunk_key(index);
            let encoded = serde_json::to_string(chunk)
                .map_err(|source| StoreError::Encode { key: key.clone(), source })?;
            self.medium.set(&key, &encoded)?;
            debug!(key = %key, records = chunk.len(), "wrote chunk");
            chunk_keys.push(key);
        }

        let metadata = StorageMetadata::new(components.len(), chunk_keys);
        self.write_metadata(&metadata)
    }

    pub fn load(&self) -> Vec<Component> {
        self.try_load().unwrap_or_else(|e| {
            error!(error = %e, "error loading component data");
            Vec::new()
        })
    }

    /// Concatenate every listed chunk in order. A chunk key that has gone
    /// missing is skipped; a chunk that does not parse fails the load.
    pub fn try_load(&self) -> Result<Vec<Component>> {
        let Some(metadata) = self.read_metadata()? else {
            return Ok(Vec::new());
        };
        if metadata.total_components == 0 {
            return Ok(Vec::new());
        }
        let mut components = Vec::with_capacity(metadata.total_components);
        for key in &metadata.chunk_keys {
            match self.read_chunk(key)? {
                Some(chunk) => components.extend(chunk),
                None => warn!(key = %key, "chunk listed in metadata is missing; skipping"),
            }
        }
        Ok(components)
    }

    pub fn load_by_id(&self, id: &str) -> Option<Component> {
        self.try_load_by_id(id).unwrap_or_else(|e| {
            error!(error = %e, id, "error loading component by id");
            None
        })
    }

    /// Exact `id` match anywhere in the collection wins; otherwise the first
    /// component whose `id` or `name` matches case-insensitively.
    pub fn try_load_by_id(&self, id: &str) -> Result<Option<Component>> {
        let Some(metadata) = self.read_metadata()? else {
            return Ok(None);
        };
        let wanted = id.to_lowercase();
        let mut fallback = None;
        for key in &metadata.chunk_keys {
            let Some(chunk) = self.read_chunk(key)? else {
                continue;
            };
            for component in chunk {
                if component.id == id {
                    return Ok(Some(component));
                }
                if fallback.is_none()
                    && (component.id.to_lowercase() == wanted
                        || component.name.to_lowercase() == wanted)
                {
                    fallback = Some(component);
                }
            }
        }
        Ok(fallback)
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.try_clear() {
            error!(error = %e, "error clearing component data");
        }
    }

    /// Remove every chunk named by the metadata, then the metadata itself.
    /// A corrupt metadata record is still removed.
    pub fn try_clear(&mut self) -> Result<()> {
        match self.read_metadata() {
            Ok(Some(metadata)) => {
                for key in &metadata.chunk_keys {
                    self.medium.remove(key)?;
                }
            }
            Ok(None) => {}
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!(error = %e, "metadata is corrupt; orphaned chunks may remain");
            }
            Err(e) => return Err(e),
        }
        self.medium.remove(&self.options.metadata_key())?;
        Ok(())
    }

    pub fn stats(&self) -> StorageStats {
        self.try_stats().unwrap_or_else(|e| {
            error!(error = %e, "error getting storage stats");
            StorageStats::empty(self.quota())
        })
    }

    pub fn try_stats(&self) -> Result<StorageStats> {
        let metadata_key = self.options.metadata_key();
        let mut component_count = 0;
        let mut component_data_size = 0;
        let mut last_updated = None;
        if let Some(raw) = self.medium.get(&metadata_key)? {
            component_data_size += utf16_bytes(&raw);
            let metadata = parse_metadata(&metadata_key, &raw)?;
            component_count = metadata.total_components;
            for key in &metadata.chunk_keys {
                if let Some(chunk) = self.medium.get(key)? {
                    component_data_size += utf16_bytes(&chunk);
                }
            }
            last_updated = Some(metadata.last_updated);
        }

        let mut total_used = 0;
        for key in self.medium.keys()? {
            if let Some(value) = self.medium.get(&key)? {
                total_used += entry_footprint(&key, &value);
            }
        }

        let limit = self.quota();
        #[allow(clippy::cast_precision_loss)]
        let percent_used = if limit == 0 { 0.0 } else { total_used as f64 / limit as f64 * 100.0 };
        Ok(StorageStats {
            component_count,
            component_data_size,
            component_data_size_formatted: format_bytes(component_data_size),
            total_used,
            total_used_formatted: format_bytes(total_used),
            limit,
            limit_formatted: format_bytes(limit),
            percent_used,
            last_updated,
        })
    }

    /// Round-trip a probe value through the medium.
    pub fn verify(&mut self) -> bool {
        self.probe().unwrap_or_else(|e| {
            error!(error = %e, "storage verification failed");
            false
        })
    }

    fn probe(&mut self) -> Result<bool> {
        self.medium.set(PROBE_KEY, PROBE_VALUE)?;
        let value = self.medium.get(PROBE_KEY)?;
        self.medium.remove(PROBE_KEY)?;
        Ok(value.as_deref() == Some(PROBE_VALUE))
    }

    fn quota(&self) -> u64 {
        self.medium.quota().unwrap_or(DEFAULT_QUOTA_BYTES)
    }

    fn read_metadata(&self) -> Result<Option<StorageMetadata>> {
        let key = self.options.metadata_key();
        match self.medium.get(&key)? {
            Some(raw) => parse_metadata(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    fn write_metadata(&mut self, metadata: &StorageMetadata) -> Result<()> {
        let key = self.options.metadata_key();
        let encoded = serde_json::to_string(metadata)
            .map_err(|source| StoreError::Encode { key: key.clone(), source })?;
        self.medium.set(&key, &encoded)?;
        Ok(())
    }

    fn read_chunk(&self, key: &str) -> Result<Option<Vec<Component>>> {
        let Some(raw) = self.medium.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key: key.to_string(), source })
    }
}

fn parse_metadata(key: &str, raw: &str) -> Result<StorageMetadata> {
    serde_json::from_str(raw).map_err(|source| StoreError::Corrupt { key: key.to_string(), source })
}

fn utf16_bytes(s: &str) -> u64 {
    (s.encode_utf16().count() as u64) * 2
}
