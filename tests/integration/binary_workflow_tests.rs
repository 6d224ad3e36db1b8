/*!
 * DOCUMENT and IMAGE requests through `translate_binary`
 */

use textbridge::database::Repository;
use textbridge::providers::mock::MockProvider;
use textbridge::{RequestOptions, TranslationError, TranslationRequest};

use crate::common;

#[tokio::test]
async fn test_translateDocument_withDocx_shouldTranslateExtractedText() {
    common::init_logging();
    let mock = MockProvider::working();
    let service = common::service_with(&common::extracting_collaborators(&mock), None, None);
    let docx = common::build_docx(&["Annual report"]);
    let request = TranslationRequest::document(docx.clone(), common::DOCX_MEDIA_TYPE, "en", "pt");

    let response = service.translate_binary(&request).await.unwrap();

    assert_eq!(response.results.len(), 1);
    let result = &response.results[0];
    assert_eq!(result.translated_text, "[TRANSLATED to pt] Annual report");
    assert_eq!(result.original_text, format!("binary:{}", Repository::hash_bytes(&docx)));
    assert!(!result.fallback);
    assert_eq!(mock.calls(), vec!["Annual report".to_string()]);
}

#[tokio::test]
async fn test_translateDocument_twice_shouldServeSecondRunFromCache() {
    let mock = MockProvider::working();
    let service = common::service_with(
        &common::extracting_collaborators(&mock),
        Some(common::memory_cache()),
        None,
    );
    let request = TranslationRequest::document(b"Plain notes".to_vec(), "text/plain", "en", "de");

    let first = service.translate_binary(&request).await.unwrap();
    let second = service.translate_binary(&request).await.unwrap();

    assert!(!first.results[0].from_cache);
    assert!(second.results[0].from_cache);
    assert_eq!(second.results[0].translated_text, "[TRANSLATED to de] Plain notes");
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_translateDocument_withUnsupportedMediaType_shouldFallBack() {
    let mock = MockProvider::working();
    let service = common::service_with(&common::extracting_collaborators(&mock), None, None);
    let request = TranslationRequest::document(b"%PDF-1.4".to_vec(), "application/pdf", "en", "pt");

    let response = service.translate_binary(&request).await.unwrap();

    assert!(response.results[0].fallback);
    assert_eq!(response.results[0].translated_text, "%PDF-1.4");
    assert_eq!(response.metadata.fallback_count, 1);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_translateImage_shouldCallVisionOnce() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock);
    let request = TranslationRequest::image(vec![1, 2, 3, 4], "image/png", "en", "pt");

    let response = service.translate_binary(&request).await.unwrap();

    assert_eq!(
        response.results[0].translated_text,
        "[TRANSLATED to pt] image image/png (4 bytes)"
    );
    assert_eq!(mock.request_count(), 1);
    assert_eq!(response.metadata.total_texts, 1);
}

#[tokio::test]
async fn test_translateImage_byDefault_shouldBypassCache() {
    let mock = MockProvider::working();
    let cache = common::memory_cache();
    let service = common::service_with(&common::mock_collaborators(&mock), Some(cache.clone()), None);
    let request = TranslationRequest::image(vec![9, 9, 9], "image/jpeg", "en", "pt");

    service.translate_binary(&request).await.unwrap();
    service.translate_binary(&request).await.unwrap();

    assert_eq!(mock.request_count(), 2);
    assert_eq!(cache.stats().local_entries, 0);
}

#[tokio::test]
async fn test_translateImage_withCacheEnabled_shouldReuseTranslation() {
    let mock = MockProvider::working();
    let service = common::service_with(
        &common::mock_collaborators(&mock),
        Some(common::memory_cache()),
        None,
    );
    let request = TranslationRequest::image(vec![7, 7], "image/gif", "en", "pt").with_options(RequestOptions {
        use_cache: true,
        ..RequestOptions::default()
    });

    service.translate_binary(&request).await.unwrap();
    let second = service.translate_binary(&request).await.unwrap();

    assert!(second.results[0].from_cache);
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_translateBinary_withMissingPayload_shouldBeRejected() {
    let mock = MockProvider::working();
    let service = common::mock_service(&mock);
    let mut request = TranslationRequest::document(Vec::new(), "text/plain", "en", "pt");
    request.payload = None;

    let result = service.translate_binary(&request).await;
    assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
}
