use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranslationError;
use crate::translation::model::{ContentType, TranslationRequest};
use super::RequestValidator;

/// Any tag-looking span
static HTML_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

/// Warning recorded for HTML requests without markup
pub const HTML_WITHOUT_MARKUP_WARNING: &str = "Type is HTML but no HTML tags found in texts";

/// Content-type specific rules
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatValidator;

impl RequestValidator for FormatValidator {
    fn name(&self) -> &'static str {
        "format"
    }

    fn validate(&self, request: &TranslationRequest) -> Result<Vec<String>, TranslationError> {
        debug!("Validating format and content type");

        let Some(content_type) = request.content_type else {
            return Err(TranslationError::InvalidInput(
                "Content type is required".to_string(),
            ));
        };

        let mut warnings = Vec::new();
        match content_type {
            ContentType::Document | ContentType::Image => {
                let payload = request
                    .payload
                    .as_ref()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        TranslationError::InvalidInput(format!(
                            "Binary payload is required for type {}",
                            content_type
                        ))
                    })?;
                if payload.media_type.trim().is_empty() {
                    return Err(TranslationError::InvalidInput(
                        "Media type is required for binary content".to_string(),
                    ));
                }
            }
            ContentType::Text | ContentType::Html => {
                if request.payload.is_some() {
                    return Err(TranslationError::InvalidInput(format!(
                        "Type {} does not accept a binary payload",
                        content_type
                    )));
                }
                if content_type == ContentType::Html
                    && !request.texts.iter().any(|text| HTML_TAG_REGEX.is_match(text))
                {
                    warn!("{}", HTML_WITHOUT_MARKUP_WARNING);
                    warnings.push(HTML_WITHOUT_MARKUP_WARNING.to_string());
                }
            }
        }

        Ok(warnings)
    }
}
