use crate::models::UrlRecord;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, UrlRecord>,
    by_url: HashMap<String, i64>,
    by_code: HashMap<String, i64>,
}

/// In-process storage with the same semantics as the SQL backends.
///
/// Ids start at 1 and are never reused. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    table: RwLock<Table>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, including ones without a code
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn find_by_url(&self, long_url: &str) -> StorageResult<Option<UrlRecord>> {
        let table = self.table.read().await;
        Ok(table
            .by_url
            .get(long_url)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn find_by_code(&self, short_code: &str) -> StorageResult<Option<UrlRecord>> {
        let table = self.table.read().await;
        Ok(table
            .by_code
            .get(short_code)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn insert(&self, long_url: &str) -> StorageResult<i64> {
        let mut table = self.table.write().await;
        if table.by_url.contains_key(long_url) {
            return Err(StorageError::Conflict);
        }

        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            id,
            UrlRecord {
                id,
                long_url: long_url.to_string(),
                short_code: None,
            },
        );
        table.by_url.insert(long_url.to_string(), id);

        Ok(id)
    }

    async fn set_code(&self, id: i64, short_code: &str) -> StorageResult<()> {
        let mut table = self.table.write().await;

        if let Some(owner) = table.by_code.get(short_code) {
            if *owner != id {
                return Err(StorageError::Other(anyhow!(
                    "short code {short_code} already belongs to record {owner}"
                )));
            }
        }

        let previous = match table.rows.get_mut(&id) {
            Some(record) => record.short_code.replace(short_code.to_string()),
            None => return Err(StorageError::NotFound(id)),
        };
        if let Some(previous) = previous {
            table.by_code.remove(&previous);
        }
        table.by_code.insert(short_code.to_string(), id);

        Ok(())
    }
}
