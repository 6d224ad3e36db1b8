/*!
 * Provider failures must degrade results, never the request
 */

use textbridge::providers::mock::MockProvider;
use textbridge::{RequestOptions, TranslationRequest};

use crate::common;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_translate_withOneFailingText_shouldPassItThrough() {
    common::init_logging();
    let mock = MockProvider::fail_matching("broken");
    let service = common::mock_service(&mock);
    let request = TranslationRequest::text(texts(&["first", "a broken one", "last"]), "en", "pt");

    let response = service.translate(&request).await.unwrap();

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0].translated_text, "[TRANSLATED to pt] first");
    assert_eq!(response.results[1].translated_text, "a broken one");
    assert!(response.results[1].fallback);
    assert_eq!(response.results[2].translated_text, "[TRANSLATED to pt] last");
    assert_eq!(response.metadata.fallback_count, 1);
    assert!(!response.metadata.warnings.is_empty());
}

#[tokio::test]
async fn test_translate_withProviderDown_shouldReturnEveryTextUntranslated() {
    let mock = MockProvider::failing();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::text(texts(&["one", "two"]), "en", "es");

    let response = service.translate(&request).await.unwrap();

    assert_eq!(response.translations(), vec!["one", "two"]);
    assert!(response.results.iter().all(|r| r.fallback));
    assert_eq!(response.metadata.fallback_count, 2);
}

#[tokio::test]
async fn test_translate_withFallback_shouldNotCacheIt() {
    let mock = MockProvider::fail_matching("broken");
    let service = common::service_with(
        &common::mock_collaborators(&mock),
        Some(common::memory_cache()),
        None,
    );
    let request = TranslationRequest::text(texts(&["fine", "broken"]), "en", "pt");

    service.translate(&request).await.unwrap();
    let calls_after_first = mock.request_count();
    let second = service.translate(&request).await.unwrap();

    // Only the failed item goes back to the provider
    assert_eq!(mock.request_count(), calls_after_first + 1);
    assert!(second.results[0].from_cache);
    assert!(!second.results[1].from_cache);
    assert!(second.results[1].fallback);
}

#[tokio::test]
async fn test_translate_withFallbackAndScrubbing_shouldReturnRedactedText() {
    let mock = MockProvider::failing();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::text(texts(&["write to ana@example.com"]), "en", "pt");

    let response = service.translate(&request).await.unwrap();

    // The passthrough is the text the provider would have seen
    assert_eq!(response.results[0].translated_text, "write to [EMAIL REDACTED]");
    assert!(response.results[0].fallback);
    assert!(response.results[0].had_sensitive_data);
}

#[tokio::test]
async fn test_translateHtml_withProviderDown_shouldKeepOriginalMarkup() {
    let mock = MockProvider::failing();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::html(texts(&["<p>Hello</p>"]), "en", "pt").with_options(RequestOptions {
        remove_sensitive_data: false,
        ..RequestOptions::default()
    });

    let response = service.translate(&request).await.unwrap();

    assert_eq!(response.results[0].translated_text, "<p>Hello</p>");
    assert!(response.results[0].fallback);
}

#[tokio::test]
async fn test_translateImage_withVisionDown_shouldFallBackToPayloadText() {
    let mock = MockProvider::failing();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::image(b"caption".to_vec(), "image/png", "en", "pt");

    let response = service.translate_binary(&request).await.unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].translated_text, "caption");
    assert!(response.results[0].fallback);
}

#[tokio::test]
async fn test_translateImage_withNonUtf8PayloadAndVisionDown_shouldFallBackToEmptyText() {
    let mock = MockProvider::failing();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::image(vec![0x89, 0x50, 0xff, 0xfe], "image/png", "en", "pt");

    let response = service.translate_binary(&request).await.unwrap();

    assert_eq!(response.results[0].translated_text, "");
    assert!(response.results[0].fallback);
}
