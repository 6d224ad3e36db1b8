/*!
 * Tests for error types and their messages
 */

use std::error::Error;

use textbridge::translation::ContentType;
use textbridge::{ProviderError, TranslationError};

#[test]
fn test_providerError_display_shouldDescribeFailure() {
    let err = ProviderError::ApiError {
        status_code: 503,
        message: "overloaded".to_string(),
    };
    assert_eq!(err.to_string(), "API responded with error: 503 - overloaded");
    assert_eq!(ProviderError::Timeout(200).to_string(), "Call timed out after 200 ms");
}

#[test]
fn test_translationFailure_shouldExposeProviderSource() {
    let err = TranslationError::failure("image call failed", ProviderError::RateLimitExceeded("slow down".into()));
    assert_eq!(err.to_string(), "Translation failed: image call failed");
    let source = err.source().expect("source");
    assert_eq!(source.to_string(), "Rate limit exceeded: slow down");
}

#[test]
fn test_unsupportedType_shouldNameContentType() {
    let err = TranslationError::UnsupportedTranslationType(ContentType::Image);
    assert!(err.to_string().contains("IMAGE"));
    assert!(!err.is_client_error());
}
