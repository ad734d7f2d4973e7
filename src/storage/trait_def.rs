use crate::models::UrlRecord;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("long URL already exists")]
    Conflict,
    #[error("no record with id {0}")]
    NotFound(i64),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Other(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create the table and indexes)
    async fn init(&self) -> Result<()>;

    /// Get a record by its exact long URL
    async fn find_by_url(&self, long_url: &str) -> StorageResult<Option<UrlRecord>>;

    /// Get a record by its exact short code. Records without a code never match.
    async fn find_by_code(&self, short_code: &str) -> StorageResult<Option<UrlRecord>>;

    /// Insert a new record with no short code and return its id.
    /// Returns `StorageError::Conflict` if the long URL is already stored.
    async fn insert(&self, long_url: &str) -> StorageResult<i64>;

    /// Assign the short code of an existing record
    async fn set_code(&self, id: i64, short_code: &str) -> StorageResult<()>;
}
