use crate::error::Result;

/// Synchronous, size-constrained key/value medium (browser-style local
/// storage). Values are text; `set` fails instead of partially writing when
/// the medium is out of space.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
    /// Capacity of the medium in bytes, if it enforces one.
    fn quota(&self) -> Option<u64> {
        None
    }
}

/// Footprint of one entry the way browser storage accounts for it:
/// two bytes per UTF-16 code unit of key and value.
pub fn entry_footprint(key: &str, value: &str) -> u64 {
    let units = key.encode_utf16().count() + value.encode_utf16().count();
    (units as u64) * 2
}
