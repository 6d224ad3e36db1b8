/*!
 * End-to-end tests of TEXT and HTML requests through the full pipeline
 */

use std::sync::Arc;

use textbridge::database::Repository;
use textbridge::dictionary::{DictionaryStore, SqliteDictionary};
use textbridge::providers::mock::MockProvider;
use textbridge::translation::pipeline::scrub::EMAIL_PLACEHOLDER;
use textbridge::{RequestOptions, TranslationRequest};

use crate::common;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_translate_withDuplicatesAndEmail_shouldDedupAndScrub() {
    common::init_logging();
    let mock = MockProvider::working();
    let service = common::service_with(
        &common::mock_collaborators(&mock),
        Some(common::memory_cache()),
        None,
    );
    let request = TranslationRequest::text(texts(&["Hello", "Hello", "world@test.com"]), "en", "pt");

    let response = service.translate(&request).await.unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.metadata.total_texts, 3);
    assert_eq!(response.metadata.duplicates_removed, 1);
    assert_eq!(response.metadata.sensitive_data_removed, 1);

    let hello = &response.results[0];
    assert_eq!(hello.original_text, "Hello");
    assert_eq!(hello.translated_text, "[TRANSLATED to pt] Hello");
    assert_eq!(hello.source_indices, vec![0, 1]);
    assert!(!hello.had_sensitive_data);

    let email = &response.results[1];
    assert_eq!(email.original_text, "world@test.com");
    assert_eq!(email.source_indices, vec![2]);
    assert!(email.had_sensitive_data);
    assert_eq!(email.translated_text, format!("[TRANSLATED to pt] {}", EMAIL_PLACEHOLDER));

    assert_eq!(
        response.metadata.pipeline_steps,
        vec![
            "RemoveDuplicates",
            "RemoveSensitiveData",
            "CacheConsult",
            "Translation",
            "CacheSave",
            "RunSummary"
        ]
    );
}

#[tokio::test]
async fn test_translate_shouldNeverSendSensitiveDataToProvider() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::text(
        texts(&[
            "Mail me at ana@example.com",
            "CPF 123.456.789-09",
            "Call +55 11 98765-4321",
        ]),
        "pt",
        "en",
    );

    let response = service.translate(&request).await.unwrap();

    assert_eq!(response.metadata.sensitive_data_removed, 3);
    for call in mock.calls() {
        assert!(!call.contains("ana@example.com"), "leaked: {}", call);
        assert!(!call.contains("123.456.789-09"), "leaked: {}", call);
        assert!(!call.contains("98765-4321"), "leaked: {}", call);
    }
}

#[tokio::test]
async fn test_translate_twice_shouldServeSecondRunFromCache() {
    common::init_logging();
    let mock = MockProvider::working();
    let cache = common::memory_cache();
    let service = common::service_with(&common::mock_collaborators(&mock), Some(cache.clone()), None);
    let request = TranslationRequest::text(texts(&["Good morning", "Good night"]), "en", "fr");

    let first = service.translate(&request).await.unwrap();
    assert_eq!(first.metadata.cache_misses, 2);
    assert_eq!(mock.request_count(), 2);

    let second = service.translate(&request).await.unwrap();
    assert_eq!(second.metadata.cache_hits, 2);
    assert!((second.metadata.cache_hit_rate - 1.0).abs() < f64::EPSILON);
    assert!(second.results.iter().all(|r| r.from_cache));
    assert_eq!(second.translations(), first.translations());
    assert_eq!(mock.request_count(), 2);
    assert!(cache.stats().local_hits >= 2);
}

#[tokio::test]
async fn test_translate_withWhitespaceVariant_shouldNotReuseOtherVariantsTranslation() {
    let mock = MockProvider::working();
    let service = common::service_with(
        &common::mock_collaborators(&mock),
        Some(common::memory_cache()),
        None,
    );

    let padded = service
        .translate(&TranslationRequest::text(texts(&["  Hello\n"]), "en", "pt"))
        .await
        .unwrap();
    assert_eq!(padded.results[0].translated_text, "  [TRANSLATED to pt] Hello\n");

    let plain = service
        .translate(&TranslationRequest::text(texts(&["Hello"]), "en", "pt"))
        .await
        .unwrap();
    assert_eq!(plain.results[0].translated_text, "[TRANSLATED to pt] Hello");
    assert!(!plain.results[0].from_cache);

    let padded_again = service
        .translate(&TranslationRequest::text(texts(&["  Hello\n"]), "en", "pt"))
        .await
        .unwrap();
    assert!(padded_again.results[0].from_cache);
    assert_eq!(padded_again.results[0].translated_text, "  [TRANSLATED to pt] Hello\n");
}

#[tokio::test]
async fn test_translate_withCacheDisabled_shouldCallProviderEveryRun() {
    let mock = MockProvider::working();
    let service = common::service_with(
        &common::mock_collaborators(&mock),
        Some(common::memory_cache()),
        None,
    );
    let request = TranslationRequest::text(texts(&["Hello"]), "en", "pt").with_options(RequestOptions {
        use_cache: false,
        ..RequestOptions::default()
    });

    service.translate(&request).await.unwrap();
    let second = service.translate(&request).await.unwrap();

    assert_eq!(mock.request_count(), 2);
    assert!(!second.results[0].from_cache);
    assert_eq!(second.metadata.cache_hits, 0);
    assert_eq!(second.metadata.cache_misses, 1);
}

#[tokio::test]
async fn test_translate_withDuplicatesKept_shouldReturnOneResultPerText() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::text(texts(&["Hi", "Hi", "Hi"]), "en", "pt").with_options(RequestOptions {
        remove_duplicates: false,
        ..RequestOptions::default()
    });

    let response = service.translate(&request).await.unwrap();

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.metadata.duplicates_removed, 0);
    assert_eq!(response.results[2].source_indices, vec![2]);
}

#[tokio::test]
async fn test_translate_withSensitiveDataKept_shouldSendTextAsIs() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::text(texts(&["ana@example.com"]), "en", "pt").with_options(RequestOptions {
        remove_sensitive_data: false,
        ..RequestOptions::default()
    });

    let response = service.translate(&request).await.unwrap();

    assert_eq!(mock.calls(), vec!["ana@example.com".to_string()]);
    assert_eq!(response.metadata.sensitive_data_removed, 0);
    assert!(!response.results[0].had_sensitive_data);
}

#[tokio::test]
async fn test_translate_withDictionaryEntry_shouldSkipProvider() {
    let mock = MockProvider::working();
    let repository = Repository::new_in_memory().unwrap();
    let dictionary = SqliteDictionary::new(repository);
    dictionary.save("Thank you", "Obrigado", "en", "pt").await.unwrap();
    let dictionary: Arc<dyn DictionaryStore> = Arc::new(dictionary);

    let service = common::service_with(&common::mock_collaborators(&mock), None, Some(dictionary));
    let request = TranslationRequest::text(texts(&["Thank you", "Hello"]), "en", "pt");

    let response = service.translate(&request).await.unwrap();

    assert_eq!(response.translations(), vec!["Obrigado", "[TRANSLATED to pt] Hello"]);
    assert_eq!(response.metadata.dictionary_hits, 1);
    assert_eq!(mock.calls(), vec!["Hello".to_string()]);
}

#[tokio::test]
async fn test_translate_withHtmlFragment_shouldKeepMarkup() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::html(
        texts(&[r#"<p>Hello <b>world</b></p><img src="a.png" alt="A cat">"#]),
        "en",
        "pt",
    );

    let response = service.translate(&request).await.unwrap();
    let html = &response.results[0].translated_text;

    assert!(html.contains("<p>[TRANSLATED to pt] Hello <b>[TRANSLATED to pt] world</b></p>"));
    assert!(html.contains(r#"alt="[TRANSLATED to pt] A cat""#));
    assert!(!response.results[0].fallback);
    assert!(response.metadata.warnings.is_empty());
}

#[tokio::test]
async fn test_translate_withInvalidLanguage_shouldFailBeforePipeline() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::text(texts(&["Hello"]), "en", "klingon");

    assert!(service.translate(&request).await.is_err());
    assert_eq!(mock.request_count(), 0);
}
