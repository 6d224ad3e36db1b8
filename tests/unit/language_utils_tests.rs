/*!
 * Tests for language code utilities
 */

use textbridge::language_utils::{is_supported, normalize_code};
use textbridge::{get_language_name, language_codes_match, supported_languages};

#[test]
fn test_supportedLanguages_shouldHoldElevenCodes() {
    let languages = supported_languages();
    assert_eq!(languages.len(), 11);
    for code in ["pt", "en", "es", "fr", "de", "it", "ja", "ko", "zh", "ar", "ru"] {
        assert!(languages.contains(&code), "missing {}", code);
    }
}

#[test]
fn test_isSupported_shouldIgnoreCaseAndWhitespace() {
    assert!(is_supported("PT"));
    assert!(is_supported(" en "));
    assert!(!is_supported("nl"));
    assert!(!is_supported(""));
}

#[test]
fn test_languageCodesMatch_shouldCompareNormalizedCodes() {
    assert!(language_codes_match("EN", "en"));
    assert!(!language_codes_match("en", "pt"));
    assert_eq!(normalize_code(" Fr "), "fr");
}

#[test]
fn test_getLanguageName_shouldResolveEnglishNames() {
    assert_eq!(get_language_name("pt").unwrap(), "Portuguese");
    assert_eq!(get_language_name("JA").unwrap(), "Japanese");
    assert!(get_language_name("zz").is_err());
}
