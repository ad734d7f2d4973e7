use crate::models::UrlRecord;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        // short_code stays NULL until the second write of encode
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                long_url TEXT NOT NULL UNIQUE,
                short_code TEXT UNIQUE
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn find_by_url(&self, long_url: &str) -> StorageResult<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, long_url, short_code
            FROM urls
            WHERE long_url = ?
            "#,
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn find_by_code(&self, short_code: &str) -> StorageResult<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, long_url, short_code
            FROM urls
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn insert(&self, long_url: &str) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO urls (long_url)
            VALUES (?)
            ON CONFLICT(long_url) DO NOTHING
            "#,
        )
        .bind(long_url)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        Ok(result.last_insert_rowid())
    }

    async fn set_code(&self, id: i64, short_code: &str) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET short_code = ?
            WHERE id = ?
            "#,
        )
        .bind(short_code)
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }

        Ok(())
    }
}
