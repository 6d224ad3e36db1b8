/*!
 * Two-tier cache with read-through promotion.
 *
 * `get` checks the local tier first; a shared-tier hit is copied into the
 * local tier before it is returned. `put` writes both tiers. Shared-tier
 * failures degrade to local-only behavior and are logged, never returned.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};

use super::local::LocalTier;
use super::shared::SharedTier;
use super::TranslationCache;

/// Hit counters per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheTierStats {
    pub local_hits: u64,
    pub shared_hits: u64,
    pub misses: u64,
    pub local_entries: usize,
}

impl CacheTierStats {
    /// Fraction of lookups served by either tier
    pub fn hit_rate(&self) -> f64 {
        let total = self.local_hits + self.shared_hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.local_hits + self.shared_hits) as f64 / total as f64
        }
    }
}

/// Local tier in front of a shared tier
#[derive(Debug)]
pub struct TwoTierCache {
    local: LocalTier,
    shared: Arc<dyn SharedTier>,
    local_hits: AtomicU64,
    shared_hits: AtomicU64,
    misses: AtomicU64,
}

impl TwoTierCache {
    pub fn new(local: LocalTier, shared: Arc<dyn SharedTier>) -> Self {
        Self {
            local,
            shared,
            local_hits: AtomicU64::new(0),
            shared_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Build from capacity and TTL settings
    pub fn with_settings(
        local_capacity: usize,
        local_ttl: Duration,
        shared: Arc<dyn SharedTier>,
    ) -> Self {
        Self::new(LocalTier::new(local_capacity, local_ttl), shared)
    }

    /// Current counters
    pub fn stats(&self) -> CacheTierStats {
        CacheTierStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            shared_hits: self.shared_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            local_entries: self.local.len(),
        }
    }

    /// Empty the local tier; the shared tier is untouched
    pub fn clear_local(&self) {
        self.local.clear();
        debug!("Local cache tier cleared");
    }

    /// Remove expired rows from the shared tier
    pub async fn purge_expired(&self) -> Result<i64> {
        self.shared.purge_expired().await
    }

    pub fn local(&self) -> &LocalTier {
        &self.local
    }
}

#[async_trait]
impl TranslationCache for TwoTierCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.local.get(key) {
            self.local_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(value));
        }

        match self.shared.get(key).await {
            Ok(Some(value)) => {
                self.shared_hits.fetch_add(1, Ordering::Relaxed);
                self.local.put(key, &value);
                debug!("Promoted shared cache entry into local tier");
                Ok(Some(value))
            }
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => {
                warn!("Shared cache tier lookup failed, treating as miss: {}", e);
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.local.put(key, value);
        if let Err(e) = self.shared.put(key, value).await {
            warn!("Shared cache tier write failed: {}", e);
        }
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<()> {
        self.local.evict(key);
        if let Err(e) = self.shared.delete(key).await {
            warn!("Shared cache tier eviction failed: {}", e);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        if self.local.contains(key) {
            return Ok(true);
        }
        match self.shared.exists(key).await {
            Ok(found) => Ok(found),
            Err(e) => {
                warn!("Shared cache tier existence check failed: {}", e);
                Ok(false)
            }
        }
    }
}
