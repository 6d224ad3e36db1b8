/*!
 * Common test utilities for the textbridge test suite
 */

use std::io::{Cursor, Write};
use std::sync::{Arc, Once};
use std::time::Duration;

use textbridge::app_config::{PipelineSettings, ResilienceConfig};
use textbridge::cache::{SqliteSharedTier, TranslationCache, TwoTierCache};
use textbridge::database::Repository;
use textbridge::dictionary::DictionaryStore;
use textbridge::providers::extract::BasicExtractor;
use textbridge::providers::mock::MockProvider;
use textbridge::translation::Collaborators;
use textbridge::TranslationService;

pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

static INIT: Once = Once::new();

/// Route library logs to the test output once per process
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Every capability backed by the same mock
pub fn mock_collaborators(mock: &MockProvider) -> Collaborators {
    let mock = Arc::new(mock.clone());
    Collaborators {
        translator: mock.clone(),
        extractor: mock.clone(),
        vision: mock,
    }
}

/// Mock translation and vision with real document extraction
pub fn extracting_collaborators(mock: &MockProvider) -> Collaborators {
    let mock = Arc::new(mock.clone());
    Collaborators {
        translator: mock.clone(),
        extractor: Arc::new(BasicExtractor::new()),
        vision: mock,
    }
}

/// No backoff and no retry, so failure tests stay fast
pub fn fast_resilience() -> ResilienceConfig {
    ResilienceConfig {
        max_attempts: 1,
        backoff_base_ms: 1,
        backoff_max_ms: 1,
        ..ResilienceConfig::default()
    }
}

/// Two-tier cache over an in-memory SQLite shared tier
pub fn memory_cache() -> Arc<TwoTierCache> {
    let repository = Repository::new_in_memory().expect("in-memory repository");
    let shared = Arc::new(SqliteSharedTier::new(repository, 3600));
    Arc::new(TwoTierCache::with_settings(100, Duration::from_secs(60), shared))
}

/// Service over the given collaborators with optional cache and dictionary
pub fn service_with(
    collaborators: &Collaborators,
    cache: Option<Arc<TwoTierCache>>,
    dictionary: Option<Arc<dyn DictionaryStore>>,
) -> TranslationService {
    let cache = cache.map(|cache| {
        let cache: Arc<dyn TranslationCache> = cache;
        cache
    });
    TranslationService::with_collaborators(
        collaborators,
        cache,
        dictionary,
        &fast_resilience(),
        &PipelineSettings::default(),
    )
}

/// Service over a mock provider, without cache or dictionary
pub fn mock_service(mock: &MockProvider) -> TranslationService {
    init_logging();
    service_with(&mock_collaborators(mock), None, None)
}

/// Minimal DOCX archive with one paragraph per entry
pub fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::FileOptions::default())
        .expect("start docx entry");
    writer.write_all(document.as_bytes()).expect("write docx entry");
    writer.finish().expect("finish docx").into_inner()
}
