/*!
 * Dictionary store: curated translations consulted before the provider.
 */

use anyhow::Result;
use async_trait::async_trait;

use crate::database::Repository;
use crate::database::models::DictionaryRecord;

/// Persistent text -> translation lookup per language pair
#[async_trait]
pub trait DictionaryStore: Send + Sync + std::fmt::Debug {
    async fn find_translation(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<String>>;

    async fn save(
        &self,
        text: &str,
        translation: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<()>;
}

/// Dictionary kept in the `dictionary` SQLite table
#[derive(Debug, Clone)]
pub struct SqliteDictionary {
    repository: Repository,
}

impl SqliteDictionary {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl DictionaryStore for SqliteDictionary {
    async fn find_translation(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<String>> {
        self.repository
            .find_dictionary_entry(text, source_language, target_language)
            .await
    }

    async fn save(
        &self,
        text: &str,
        translation: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<()> {
        let record = DictionaryRecord::new(
            Repository::hash_text(text),
            text.to_string(),
            source_language.to_string(),
            target_language.to_string(),
            translation.to_string(),
        );
        self.repository.save_dictionary_entry(&record).await
    }
}
