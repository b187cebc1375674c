use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying medium refused the operation (quota, I/O, bad key).
    #[error(transparent)]
    Medium(#[from] partdb_core::error::Error),

    #[error("Corrupt entry '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode chunk '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Medium(partdb_core::error::Error::QuotaExceeded { .. }))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
