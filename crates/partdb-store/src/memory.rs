use std::collections::BTreeMap;

use partdb_core::error::{Error, Result};
use partdb_core::traits::{entry_footprint, KeyValueStore};

/// Default per-origin budget of browser local storage.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// In-process medium with the same quota accounting as browser storage.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<u64>,
    used: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self { entries: BTreeMap::new(), quota: Some(quota_bytes), used: 0 }
    }

    pub fn unbounded() -> Self {
        Self { entries: BTreeMap::new(), quota: None, used: 0 }
    }

    pub fn used_bytes(&self) -> u64 {
        self.used
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.get(key).map_or(0, |old| entry_footprint(key, old));
        let needed = self.used.saturating_sub(previous) + entry_footprint(key, value);
        if let Some(limit) = self.quota {
            if needed > limit {
                return Err(Error::QuotaExceeded { needed, limit });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.used = needed;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if let Some(old) = self.entries.remove(key) {
            self.used = self.used.saturating_sub(entry_footprint(key, &old));
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn quota(&self) -> Option<u64> {
        self.quota
    }
}
