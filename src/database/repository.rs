/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for the shared cache tier and the
 * dictionary, abstracting away the SQL details.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};

use super::connection::DatabaseConnection;
use super::models::{CacheRecord, CacheStats, DictionaryRecord};

/// Repository for database operations
#[derive(Clone, Debug)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Compute SHA256 hash of text
    pub fn hash_text(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Compute SHA256 hash of a binary payload
    pub fn hash_bytes(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    // =========================================================================
    // Cache Operations
    // =========================================================================

    /// Get an unexpired cache row
    pub async fn get_cache_entry(&self, cache_key: &str) -> Result<Option<String>> {
        let cache_key = cache_key.to_string();
        let now = chrono::Utc::now().timestamp();

        self.db
            .execute_async(move |conn| {
                let value: Option<String> = conn
                    .query_row(
                        r#"
                        SELECT translated_text
                        FROM translation_cache
                        WHERE cache_key = ?1 AND expires_at > ?2
                        "#,
                        params![cache_key, now],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
    }

    /// Store a cache row; an existing row for the key is replaced (last write wins)
    pub async fn put_cache_entry(&self, record: &CacheRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO translation_cache (cache_key, translated_text, created_at, expires_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(cache_key)
                    DO UPDATE SET translated_text = excluded.translated_text,
                                  created_at = excluded.created_at,
                                  expires_at = excluded.expires_at
                    "#,
                    params![
                        record.cache_key,
                        record.translated_text,
                        record.created_at,
                        record.expires_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Delete a cache row, returning whether one existed
    pub async fn delete_cache_entry(&self, cache_key: &str) -> Result<bool> {
        let cache_key = cache_key.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM translation_cache WHERE cache_key = ?1",
                    [cache_key],
                )?;
                Ok(deleted > 0)
            })
            .await
    }

    /// Whether an unexpired row exists for the key
    pub async fn cache_entry_exists(&self, cache_key: &str) -> Result<bool> {
        Ok(self.get_cache_entry(cache_key).await?.is_some())
    }

    /// Remove rows past their expiry
    pub async fn purge_expired_cache(&self) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute(
                    "DELETE FROM translation_cache WHERE expires_at <= ?1",
                    [now],
                )?;
                if deleted > 0 {
                    debug!("Purged {} expired cache rows", deleted);
                }
                Ok(deleted as i64)
            })
            .await
    }

    /// Get cache statistics
    pub async fn get_cache_stats(&self) -> Result<CacheStats> {
        let now = chrono::Utc::now().timestamp();

        self.db
            .execute_async(move |conn| {
                let total_entries: i64 = conn
                    .query_row("SELECT COUNT(*) FROM translation_cache", [], |row| row.get(0))
                    .unwrap_or(0);

                let expired_entries: i64 = conn
                    .query_row(
                        "SELECT COUNT(*) FROM translation_cache WHERE expires_at <= ?1",
                        [now],
                        |row| row.get(0),
                    )
                    .unwrap_or(0);

                Ok(CacheStats {
                    total_entries,
                    expired_entries,
                })
            })
            .await
    }

    /// Clear the shared cache tier
    pub async fn clear_cache(&self) -> Result<i64> {
        self.db
            .execute_async(|conn| {
                let deleted = conn.execute("DELETE FROM translation_cache", [])?;
                Ok(deleted as i64)
            })
            .await
    }

    // =========================================================================
    // Dictionary Operations
    // =========================================================================

    /// Look up a dictionary translation
    pub async fn find_dictionary_entry(
        &self,
        source_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<String>> {
        let source_text_hash = Self::hash_text(source_text);
        let source_language = source_language.to_lowercase();
        let target_language = target_language.to_lowercase();

        self.db
            .execute_async(move |conn| {
                let value: Option<String> = conn
                    .query_row(
                        r#"
                        SELECT translated_text
                        FROM dictionary
                        WHERE source_text_hash = ?1
                          AND source_language = ?2
                          AND target_language = ?3
                        "#,
                        params![source_text_hash, source_language, target_language],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
    }

    /// Store a dictionary translation, replacing an existing one
    pub async fn save_dictionary_entry(&self, record: &DictionaryRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO dictionary (
                        source_text_hash, source_text, source_language, target_language,
                        translated_text, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(source_text_hash, source_language, target_language)
                    DO UPDATE SET translated_text = excluded.translated_text
                    "#,
                    params![
                        record.source_text_hash,
                        record.source_text,
                        record.source_language.to_lowercase(),
                        record.target_language.to_lowercase(),
                        record.translated_text,
                        record.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }
}
