use log::debug;

use crate::errors::TranslationError;
use crate::translation::model::TranslationRequest;
use super::RequestValidator;

/// Default maximum number of texts per request
pub const DEFAULT_MAX_TEXTS: usize = 1000;

/// Default maximum characters per text
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 10_000;

/// Default maximum binary payload size (10 MiB)
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Batch, text and payload size limits
#[derive(Debug, Clone, Copy)]
pub struct SizeValidator {
    pub max_texts: usize,
    pub max_text_length: usize,
    pub max_payload_bytes: usize,
}

impl Default for SizeValidator {
    fn default() -> Self {
        Self {
            max_texts: DEFAULT_MAX_TEXTS,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl RequestValidator for SizeValidator {
    fn name(&self) -> &'static str {
        "size"
    }

    fn validate(&self, request: &TranslationRequest) -> Result<Vec<String>, TranslationError> {
        debug!("Validating sizes and limits");

        if request.texts.len() > self.max_texts {
            return Err(TranslationError::InvalidInput(format!(
                "Maximum {} texts allowed, received {}",
                self.max_texts,
                request.texts.len()
            )));
        }

        // Length is counted in characters, not bytes
        if let Some((index, _)) = request
            .texts
            .iter()
            .enumerate()
            .find(|(_, text)| text.chars().count() > self.max_text_length)
        {
            return Err(TranslationError::InvalidInput(format!(
                "Text at index {} exceeds maximum length of {} characters",
                index, self.max_text_length
            )));
        }

        if let Some(payload) = &request.payload {
            if payload.len() > self.max_payload_bytes {
                return Err(TranslationError::InvalidInput(format!(
                    "Payload of {} bytes exceeds maximum of {} MiB",
                    payload.len(),
                    self.max_payload_bytes / (1024 * 1024)
                )));
            }
        }

        Ok(Vec::new())
    }
}
