use std::marker::PhantomData;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::Identified;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub mod tables {
    pub const ALBUMS: &str = "albums";
    pub const MUSICIANS: &str = "musicians";
    pub const COLLECTORS: &str = "collectors";

    pub const ALL: &[&str] = &[ALBUMS, MUSICIANS, COLLECTORS];
}

/// Open (or create) the cache database and ensure its schema.
///
/// Each entity type gets one table of `(id, payload)` rows where the
/// payload is the JSON-encoded entity. The cache is advisory and never
/// authoritative, so a relational schema would buy nothing over blobs.
pub async fn open_store(path: &Path) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    for table in tables::ALL {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY, payload TEXT NOT NULL)",
            table
        ))
        .execute(&pool)
        .await?;
    }

    info!("Cache store opened at {}", path.display());
    Ok(pool)
}

/// Read-through cache for one entity type.
pub struct EntityStore<T> {
    pool: SqlitePool,
    table: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table,
            _entity: PhantomData,
        }
    }
}

impl<T> EntityStore<T>
where
    T: Identified + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(pool: SqlitePool, table: &'static str) -> Self {
        Self {
            pool,
            table,
            _entity: PhantomData,
        }
    }

    /// Return the cached snapshot in insertion order. Rows that fail to
    /// decode are skipped with a warning rather than failing the read.
    pub async fn read_all(&self) -> Result<Vec<T>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as(&format!("SELECT payload FROM {} ORDER BY rowid", self.table))
                .fetch_all(&self.pool)
                .await?;

        let mut entities = Vec::with_capacity(rows.len());
        for (payload,) in rows {
            match serde_json::from_str(&payload) {
                Ok(entity) => entities.push(entity),
                Err(e) => warn!("skipping undecodable {} cache row: {}", self.table, e),
            }
        }
        Ok(entities)
    }

    /// Replace the cached snapshot with `items`, delete-then-insert in one
    /// transaction.
    pub async fn replace_all(&self, items: &[T]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&mut *tx)
            .await?;
        for item in items {
            let payload = serde_json::to_string(item)?;
            sqlx::query(&format!(
                "INSERT OR REPLACE INTO {} (id, payload) VALUES (?, ?)",
                self.table
            ))
            .bind(item.id())
            .bind(payload)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Refresh the cache in the background. Failures are logged, never
    /// surfaced; the cache must not block or fail the read path.
    pub fn spawn_replace_all(&self, items: &[T])
    where
        T: Clone,
    {
        let store = self.clone();
        let items = items.to_vec();
        tokio::spawn(async move {
            if let Err(e) = store.replace_all(&items).await {
                warn!("cache refresh for {} failed: {}", store.table, e);
            }
        });
    }
}
