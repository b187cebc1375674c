use thiserror::Error;

use partdb_store::StoreError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid match options: {0}")]
    InvalidOptions(String),

    #[error("Component not found: {0}")]
    TargetNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
