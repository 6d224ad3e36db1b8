use log::debug;

use crate::errors::TranslationError;
use crate::language_utils::{is_supported, language_codes_match, normalize_code, supported_languages};
use crate::translation::model::TranslationRequest;
use super::RequestValidator;

/// Both languages must be supported and must differ
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageValidator;

impl LanguageValidator {
    fn check_supported(role: &str, code: &str) -> Result<(), TranslationError> {
        if is_supported(code) {
            Ok(())
        } else {
            Err(TranslationError::UnsupportedLanguage(format!(
                "{} language '{}' is not supported. Supported languages: {}",
                role,
                normalize_code(code),
                supported_languages().join(", ")
            )))
        }
    }
}

impl RequestValidator for LanguageValidator {
    fn name(&self) -> &'static str {
        "language"
    }

    fn validate(&self, request: &TranslationRequest) -> Result<Vec<String>, TranslationError> {
        debug!("Validating supported languages");

        Self::check_supported("Source", &request.source_language)?;
        Self::check_supported("Target", &request.target_language)?;

        if language_codes_match(&request.source_language, &request.target_language) {
            return Err(TranslationError::UnsupportedLanguage(
                "Source and target languages must be different".to_string(),
            ));
        }

        Ok(Vec::new())
    }
}
