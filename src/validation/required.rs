use log::debug;

use crate::errors::TranslationError;
use crate::translation::model::TranslationRequest;
use super::RequestValidator;

/// Texts (unless binary), both languages and the content type must be present
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFieldsValidator;

impl RequestValidator for RequiredFieldsValidator {
    fn name(&self) -> &'static str {
        "required-fields"
    }

    fn validate(&self, request: &TranslationRequest) -> Result<Vec<String>, TranslationError> {
        debug!("Validating required fields");

        if request.texts.is_empty() && !request.is_binary() {
            return Err(TranslationError::InvalidInput(
                "Texts list cannot be empty".to_string(),
            ));
        }
        if request.source_language.trim().is_empty() {
            return Err(TranslationError::InvalidInput(
                "Source language is required".to_string(),
            ));
        }
        if request.target_language.trim().is_empty() {
            return Err(TranslationError::InvalidInput(
                "Target language is required".to_string(),
            ));
        }
        if request.content_type.is_none() {
            return Err(TranslationError::InvalidInput(
                "Content type is required".to_string(),
            ));
        }

        Ok(Vec::new())
    }
}
