use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for the fixed set of supported language pairs.
///
/// Codes are ISO 639-1 (2-letter) and compared case-insensitively.
const SUPPORTED_LANGUAGES: &[&str] = &["pt", "en", "es", "fr", "de", "it", "ja", "ko", "zh", "ar", "ru"];

/// The fixed list of language codes accepted by the validator chain
pub fn supported_languages() -> &'static [&'static str] {
    SUPPORTED_LANGUAGES
}

/// Normalize a language code for comparison and cache keys
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Check whether a language code belongs to the supported set (case-insensitive)
pub fn is_supported(code: &str) -> bool {
    let normalized = normalize_code(code);
    SUPPORTED_LANGUAGES.contains(&normalized.as_str())
}

/// Check if two language codes refer to the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    normalize_code(code1) == normalize_code(code2)
}

/// Get the English name of a language from its ISO 639-1 code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_code(code);
    Language::from_639_1(&normalized)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
