use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conversation changed concurrently, write abandoned")]
    Conflict,

    #[error("database error: {0}")]
    Unavailable(#[from] rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
