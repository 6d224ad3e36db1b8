/*!
 * Shared cache tier.
 *
 * The shared tier outlives a process and is visible to every pipeline run
 * using the same store. The default implementation keeps rows in SQLite
 * with an expiry timestamp per row.
 */

use anyhow::Result;
use async_trait::async_trait;

use crate::database::Repository;
use crate::database::models::{CacheRecord, CacheStats};

/// Larger, slower tier behind the local one
#[async_trait]
pub trait SharedTier: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Returns whether a row was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Drop expired rows; returns how many were removed
    async fn purge_expired(&self) -> Result<i64> {
        Ok(0)
    }
}

/// SQLite-backed shared tier
#[derive(Debug, Clone)]
pub struct SqliteSharedTier {
    repository: Repository,
    ttl_secs: u64,
}

impl SqliteSharedTier {
    pub fn new(repository: Repository, ttl_secs: u64) -> Self {
        Self {
            repository,
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Row counts of the backing table
    pub async fn stats(&self) -> Result<CacheStats> {
        self.repository.get_cache_stats().await
    }
}

#[async_trait]
impl SharedTier for SqliteSharedTier {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.repository.get_cache_entry(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let record = CacheRecord::new(key.to_string(), value.to_string(), self.ttl_secs);
        self.repository.put_cache_entry(&record).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.repository.delete_cache_entry(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.repository.cache_entry_exists(key).await
    }

    async fn purge_expired(&self) -> Result<i64> {
        self.repository.purge_expired_cache().await
    }
}
