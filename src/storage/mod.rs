pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Open the configured backend. The schema is not created here, call `init`.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.url);
            Arc::new(SqliteStorage::new(&config.url, config.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage");
            Arc::new(PostgresStorage::new(&config.url, config.max_connections).await?)
        }
        DatabaseBackend::Memory => {
            info!("Using in-memory storage, records are lost on exit");
            Arc::new(MemoryStorage::new())
        }
    };

    Ok(storage)
}
