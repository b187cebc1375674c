//! Directory-backed medium: one `<key>.kv` file per entry.
//!
//! Writes go through a temp file in the same directory and are renamed into
//! place, so a crashed write never leaves a half-written value behind. The
//! quota is accounted for in memory from a scan taken at open time; other
//! processes writing the same directory are not coordinated.
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use partdb_core::error::{Error, Result};
use partdb_core::traits::{entry_footprint, KeyValueStore};
use tracing::debug;
use walkdir::WalkDir;

const EXTENSION: &str = "kv";

pub struct FileStore {
    dir: PathBuf,
    quota: Option<u64>,
    used: u64,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>, quota: Option<u64>) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            return Err(Error::Unavailable(format!("{} is not a directory", dir.display())));
        }
        fs::create_dir_all(&dir)?;
        let mut store = Self { dir, quota, used: 0 };
        let mut used = 0;
        for key in store.keys()? {
            if let Some(value) = store.get(&key)? {
                used += entry_footprint(&key, &value);
            }
        }
        store.used = used;
        debug!(dir = %store.dir.display(), used, "opened file store");
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(Error::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let previous = self.get(key)?.map_or(0, |old| entry_footprint(key, &old));
        let needed = self.used.saturating_sub(previous) + entry_footprint(key, value);
        if let Some(limit) = self.quota {
            if needed > limit {
                return Err(Error::QuotaExceeded { needed, limit });
            }
        }
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        self.used = needed;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let previous = self.get(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(old) = previous {
            self.used = self.used.saturating_sub(entry_footprint(key, &old));
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some(EXTENSION)
            {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_valid_key(stem) => keys.push(stem.to_string()),
                _ => debug!(path = %path.display(), "ignoring file with a non-key name"),
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn quota(&self) -> Option<u64> {
        self.quota
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
