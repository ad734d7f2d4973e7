use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShortenerError {
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Short URL not found")]
    NotFound,
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

pub type ShortenerResult<T> = Result<T, ShortenerError>;
