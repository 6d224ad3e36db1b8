/*!
 * Tests for the request validator chain
 */

use textbridge::translation::model::TranslationRequest;
use textbridge::validation::format::HTML_WITHOUT_MARKUP_WARNING;
use textbridge::validation::size::DEFAULT_MAX_TEXTS;
use textbridge::validation::ValidatorChain;
use textbridge::TranslationError;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_standardChain_shouldRunValidatorsInOrder() {
    assert_eq!(
        ValidatorChain::standard().names(),
        vec!["required-fields", "size", "language", "format"]
    );
}

#[test]
fn test_validate_withValidTextRequest_shouldPassWithoutWarnings() {
    let request = TranslationRequest::text(texts(&["Hello"]), "en", "pt");
    let warnings = ValidatorChain::standard().validate(&request).unwrap();
    assert!(warnings.is_empty());
}

#[test]
fn test_validate_withEmptyTexts_shouldRejectAsInvalidInput() {
    let request = TranslationRequest::text(Vec::new(), "en", "pt");
    let result = ValidatorChain::standard().validate(&request);
    assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
}

#[test]
fn test_validate_withEmptyTextsAndBadLanguage_shouldReportRequiredFieldsFirst() {
    // Both checks fail; the earlier validator wins
    let request = TranslationRequest::text(Vec::new(), "xx", "pt");
    let result = ValidatorChain::standard().validate(&request);
    assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
}

#[test]
fn test_validate_withMissingLanguageAndTooManyTexts_shouldFailOnRequiredFields() {
    let many = vec!["a".to_string(); DEFAULT_MAX_TEXTS + 1];
    let request = TranslationRequest::text(many, "", "pt");
    match ValidatorChain::standard().validate(&request) {
        Err(TranslationError::InvalidInput(message)) => {
            assert_eq!(message, "Source language is required")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_validate_withTooManyTexts_shouldReject() {
    let many = vec!["a".to_string(); DEFAULT_MAX_TEXTS + 1];
    let request = TranslationRequest::text(many, "en", "pt");
    let result = ValidatorChain::standard().validate(&request);
    assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
}

#[test]
fn test_validate_withUnsupportedLanguage_shouldRejectAsUnsupportedLanguage() {
    let request = TranslationRequest::text(texts(&["Hello"]), "en", "xx");
    let result = ValidatorChain::standard().validate(&request);
    assert!(matches!(result, Err(TranslationError::UnsupportedLanguage(_))));
}

#[test]
fn test_validate_withSameLanguageDifferentCase_shouldReject() {
    let request = TranslationRequest::text(texts(&["Hello"]), "EN", "en");
    let result = ValidatorChain::standard().validate(&request);
    assert!(matches!(result, Err(TranslationError::UnsupportedLanguage(_))));
}

#[test]
fn test_validate_withHtmlWithoutTags_shouldPassWithWarning() {
    let request = TranslationRequest::html(texts(&["plain text"]), "en", "pt");
    let warnings = ValidatorChain::standard().validate(&request).unwrap();
    assert_eq!(warnings, vec![HTML_WITHOUT_MARKUP_WARNING.to_string()]);
}

#[test]
fn test_validate_withHtmlMarkup_shouldPassWithoutWarning() {
    let request = TranslationRequest::html(texts(&["<p>Hi</p>"]), "en", "pt");
    assert!(ValidatorChain::standard().validate(&request).unwrap().is_empty());
}

#[test]
fn test_validate_withEmptyImagePayload_shouldReject() {
    let request = TranslationRequest::image(Vec::new(), "image/png", "en", "pt");
    let result = ValidatorChain::standard().validate(&request);
    assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
}

#[test]
fn test_validate_withDocumentPayload_shouldPass() {
    let request = TranslationRequest::document(b"Hello".to_vec(), "text/plain", "en", "pt");
    assert!(ValidatorChain::standard().validate(&request).is_ok());
}
