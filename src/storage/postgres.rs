use crate::models::UrlRecord;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id BIGSERIAL PRIMARY KEY,
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
            WHERE long_url = $1
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
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn insert(&self, long_url: &str) -> StorageResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO urls (long_url)
            VALUES ($1)
            ON CONFLICT (long_url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(long_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        id.ok_or(StorageError::Conflict)
    }

    async fn set_code(&self, id: i64, short_code: &str) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET short_code = $1
            WHERE id = $2
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
