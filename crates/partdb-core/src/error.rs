use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage quota exceeded: {needed} bytes needed, limit is {limit} bytes")]
    QuotaExceeded { needed: u64, limit: u64 },

    #[error("Storage medium unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejections raised while validating an upload or reading a raw catalog,
/// before anything reaches the store.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Payload is too large for the storage medium: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Data must be an array of components")]
    NotAnArray,

    #[error("Component at index {index} is malformed: {source}")]
    InvalidComponent {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
