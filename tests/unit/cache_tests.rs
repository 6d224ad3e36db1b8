/*!
 * Tests for the two-tier translation cache
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use textbridge::cache::{
    cache_key, LocalTier, SharedTier, SqliteSharedTier, TranslationCache, TwoTierCache,
};
use textbridge::database::Repository;

use crate::common;

/// Shared tier that counts lookups before delegating to SQLite
#[derive(Debug)]
struct CountingShared {
    inner: SqliteSharedTier,
    gets: AtomicUsize,
}

impl CountingShared {
    fn new() -> Self {
        let repository = Repository::new_in_memory().unwrap();
        Self {
            inner: SqliteSharedTier::new(repository, 3600),
            gets: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SharedTier for CountingShared {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }
}

#[tokio::test]
async fn test_get_withSharedOnlyEntry_shouldPromoteIntoLocalTier() {
    let shared = Arc::new(CountingShared::new());
    shared.put("k", "v").await.unwrap();
    let cache = TwoTierCache::new(LocalTier::new(10, Duration::from_secs(60)), shared.clone());

    assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    assert_eq!(shared.gets.load(Ordering::SeqCst), 1);
    assert!(cache.local().contains("k"));

    // Served by the local tier, no second shared round trip
    assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    assert_eq!(shared.gets.load(Ordering::SeqCst), 1);

    let stats = cache.stats();
    assert_eq!(stats.shared_hits, 1);
    assert_eq!(stats.local_hits, 1);
}

#[tokio::test]
async fn test_put_shouldWriteBothTiers() {
    let cache = common::memory_cache();
    cache.put("k", "v").await.unwrap();

    cache.clear_local();
    assert!(!cache.local().contains("k"));
    assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
}

#[tokio::test]
async fn test_evict_shouldRemoveFromBothTiers() {
    let cache = common::memory_cache();
    cache.put("k", "v").await.unwrap();
    assert!(cache.exists("k").await.unwrap());

    cache.evict("k").await.unwrap();
    assert!(!cache.exists("k").await.unwrap());
    assert_eq!(cache.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_get_withUnknownKey_shouldCountMiss() {
    let cache = common::memory_cache();
    assert_eq!(cache.get("missing").await.unwrap(), None);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_cacheKey_shouldDependOnLanguagePairAndExactText() {
    let base = cache_key("en", "pt", "Hello");
    assert_eq!(base, cache_key("EN", " pt", "Hello"));
    assert_ne!(base, cache_key("en", "pt", "  Hello \n"));
    assert_ne!(base, cache_key("en", "es", "Hello"));
    assert_ne!(base, cache_key("en", "pt", "Hello!"));
}

#[tokio::test]
async fn test_roundTrip_withWhitespaceVariants_shouldKeepEachValue() {
    let cache = common::memory_cache();
    let variants = [
        ("Hello", "Olá"),
        ("  Hello\n", "  Olá\n"),
        ("Hello\r\n", "Olá\r\n"),
        ("\tHello ", "\tOlá "),
    ];

    for (text, value) in variants {
        cache.put(&cache_key("en", "pt", text), value).await.unwrap();
    }

    for (text, value) in variants {
        assert_eq!(
            cache.get(&cache_key("en", "pt", text)).await.unwrap().as_deref(),
            Some(value),
            "wrong value for {:?}",
            text
        );
    }
}

#[test]
fn test_localTier_withCapacityReached_shouldEvictLeastRecentlyUsed() {
    let local = LocalTier::new(2, Duration::from_secs(60));
    local.put("a", "1");
    local.put("b", "2");
    assert_eq!(local.get("a"), Some("1".to_string()));
    local.put("c", "3");

    assert!(local.contains("a"));
    assert!(!local.contains("b"));
    assert!(local.contains("c"));
    assert_eq!(local.len(), 2);
}
