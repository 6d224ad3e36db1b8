/*!
 * Provider implementations for the external collaborators of the pipeline.
 *
 * The pipeline only sees three capabilities:
 * - `TextTranslator`: translate one text between two languages
 * - `TextExtractor`: pull plain text out of a binary document
 * - `VisionTranslator`: extract and translate the text of an image in one call
 *
 * Concrete clients:
 * - Ollama: local LLM server (text)
 * - Anthropic: Anthropic API (text and vision)
 * - BasicExtractor: in-process extraction for plain text, HTML and DOCX
 * - MockProvider: configurable test double for all three capabilities
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::language_utils::get_language_name;
use crate::translation::model::BinaryPayload;

/// Text-translation capability
#[async_trait]
pub trait TextTranslator: Send + Sync + Debug {
    /// Translate `text` from `source_language` to `target_language`
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Text-extraction capability used for DOCUMENT inputs
#[async_trait]
pub trait TextExtractor: Send + Sync + Debug {
    async fn extract_text(&self, payload: &BinaryPayload) -> Result<String, ProviderError>;
}

/// Vision capability used for IMAGE inputs: one combined call, no batch mode
#[async_trait]
pub trait VisionTranslator: Send + Sync + Debug {
    async fn extract_and_translate(
        &self,
        payload: &BinaryPayload,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Display name of a language code, or the code itself when unknown
pub fn language_label(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.to_string())
}

/// System prompt for plain text translation
pub fn translation_system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional translator. Translate the user's text from {} to {}. \
         Preserve formatting, placeholders in square brackets and the original meaning and tone. \
         Return only the translated text.",
        language_label(source_language),
        language_label(target_language)
    )
}

/// Prompt sent with an image to a vision provider
pub fn image_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "Extract all text from this image and translate it from {} to {}. \
         Return only the translated text, preserving the original formatting as much as possible.",
        language_label(source_language),
        language_label(target_language)
    )
}

/// Map a transport-level reqwest failure onto a provider error
pub(crate) fn map_transport_error(error: reqwest::Error, timeout_ms: u64) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout_ms)
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status onto a provider error
pub(crate) fn map_status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(body),
        429 => ProviderError::RateLimitExceeded(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}

pub mod ollama;
pub mod anthropic;
pub mod extract;
pub mod mock;
