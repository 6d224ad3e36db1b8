/*!
 * Two-tier translation cache.
 *
 * A bounded, time-expiring local tier sits in front of a larger shared tier
 * with its own, longer expiry:
 * - `local`: in-process LRU map guarded by `parking_lot`
 * - `shared`: the `SharedTier` capability, backed by SQLite by default
 * - `two_tier`: read-through promotion and write-to-both policy
 *
 * Keys are content-addressed: they depend only on the language pair and the
 * exact source text, never on request identity.
 */

use anyhow::Result;
use async_trait::async_trait;

use crate::database::Repository;
use crate::language_utils::normalize_code;

pub mod local;
pub mod shared;
pub mod two_tier;

pub use local::LocalTier;
pub use shared::{SharedTier, SqliteSharedTier};
pub use two_tier::{CacheTierStats, TwoTierCache};

/// Cache capability consumed by the pipeline.
///
/// Implementations must be safe for concurrent use by several pipeline runs.
/// Errors are reported, and callers treat them as misses.
#[async_trait]
pub trait TranslationCache: Send + Sync + std::fmt::Debug {
    /// Look up a value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value under a key
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key
    async fn evict(&self, key: &str) -> Result<()>;

    /// Whether a live value exists for the key
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Deterministic key for `(source language, target language, text)`.
///
/// Only the language codes are normalized. The text is hashed exactly as
/// given, since translations keep its surrounding whitespace and line endings.
pub fn cache_key(source_language: &str, target_language: &str, text: &str) -> String {
    format!(
        "{}:{}:{}",
        normalize_code(source_language),
        normalize_code(target_language),
        Repository::hash_text(text)
    )
}
