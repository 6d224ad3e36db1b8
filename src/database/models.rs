/*!
 * Row types for the shared cache tier and the dictionary.
 */

use serde::{Deserialize, Serialize};

/// A row of the shared cache tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Content-addressed key
    pub cache_key: String,
    /// Cached translation
    pub translated_text: String,
    /// Creation time, unix seconds
    pub created_at: i64,
    /// Expiry time, unix seconds
    pub expires_at: i64,
}

impl CacheRecord {
    /// Create a record that expires `ttl_secs` from now
    pub fn new(cache_key: String, translated_text: String, ttl_secs: u64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            cache_key,
            translated_text,
            created_at: now,
            expires_at: now.saturating_add(ttl_secs as i64),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// A dictionary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    /// Database ID
    pub id: i64,
    /// SHA256 hash of source text
    pub source_text_hash: String,
    /// Original source text
    pub source_text: String,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Translated text
    pub translated_text: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl DictionaryRecord {
    /// Create a new dictionary record
    pub fn new(
        source_text_hash: String,
        source_text: String,
        source_language: String,
        target_language: String,
        translated_text: String,
    ) -> Self {
        Self {
            id: 0, // Will be assigned by database
            source_text_hash,
            source_text,
            source_language,
            target_language,
            translated_text,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared tier statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Rows currently stored, expired or not
    pub total_entries: i64,
    /// Rows already past their expiry
    pub expired_entries: i64,
}
