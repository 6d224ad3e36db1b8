/*!
 * Request and response types shared by the validator chain, the pipeline
 * and the service layer.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content carried by a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Document,
    Image,
    Html,
}

impl ContentType {
    /// Every content type, in declaration order
    pub const ALL: [ContentType; 4] = [Self::Text, Self::Document, Self::Image, Self::Html];

    /// Media types accepted for this content type
    pub fn mime_types(&self) -> &'static [&'static str] {
        match self {
            Self::Text => &["text/plain"],
            Self::Document => &[
                "application/pdf",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ],
            Self::Image => &["image/jpeg", "image/png", "image/gif", "image/bmp"],
            Self::Html => &["text/html"],
        }
    }

    /// Resolve a content type from a media type; unknown types default to `Text`
    pub fn from_mime_type(mime_type: &str) -> Self {
        let mime_type = mime_type.trim();
        Self::ALL
            .into_iter()
            .find(|ct| ct.mime_types().iter().any(|m| m.eq_ignore_ascii_case(mime_type)))
            .unwrap_or(Self::Text)
    }

    /// Whether requests of this type carry a binary payload instead of texts
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Document | Self::Image)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Document => "DOCUMENT",
            Self::Image => "IMAGE",
            Self::Html => "HTML",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-request feature flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default = "default_true")]
    pub use_cache: bool,
    #[serde(default = "default_true")]
    pub remove_duplicates: bool,
    #[serde(default = "default_true")]
    pub remove_sensitive_data: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            remove_duplicates: true,
            remove_sensitive_data: true,
        }
    }
}

/// Binary payload of a DOCUMENT or IMAGE request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPayload {
    /// Raw bytes
    pub bytes: Vec<u8>,
    /// Declared media type (e.g. "image/png")
    pub media_type: String,
}

impl BinaryPayload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A translation request as received from a caller.
///
/// Once accepted by the validator chain the request is only read; the
/// pipeline works on its own copy of the texts.
#[derive(Debug, Clone, Default)]
pub struct TranslationRequest {
    /// Source texts, in caller order
    pub texts: Vec<String>,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Kind of content; `None` is rejected by the required-fields check
    pub content_type: Option<ContentType>,
    /// Binary payload, present for DOCUMENT and IMAGE
    pub payload: Option<BinaryPayload>,
    /// Feature flags
    pub options: RequestOptions,
}

impl TranslationRequest {
    /// Plain text request
    pub fn text(texts: Vec<String>, source_language: &str, target_language: &str) -> Self {
        Self {
            texts,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            content_type: Some(ContentType::Text),
            payload: None,
            options: RequestOptions::default(),
        }
    }

    /// HTML fragments or documents passed as texts
    pub fn html(texts: Vec<String>, source_language: &str, target_language: &str) -> Self {
        Self {
            content_type: Some(ContentType::Html),
            ..Self::text(texts, source_language, target_language)
        }
    }

    /// Document upload (PDF, DOC, DOCX, plain text file)
    pub fn document(
        bytes: Vec<u8>,
        media_type: &str,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        Self {
            texts: Vec::new(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            content_type: Some(ContentType::Document),
            payload: Some(BinaryPayload::new(bytes, media_type)),
            options: RequestOptions {
                remove_duplicates: false,
                ..RequestOptions::default()
            },
        }
    }

    /// Image upload; images are not cached by default
    pub fn image(
        bytes: Vec<u8>,
        media_type: &str,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        Self {
            content_type: Some(ContentType::Image),
            options: RequestOptions {
                use_cache: false,
                remove_duplicates: false,
                remove_sensitive_data: true,
            },
            ..Self::document(bytes, media_type, source_language, target_language)
        }
    }

    /// Replace the feature flags
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether the request is handled through the binary path
    pub fn is_binary(&self) -> bool {
        self.content_type.is_some_and(|ct| ct.is_binary())
    }
}

/// Translation outcome for one deduplicated entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    /// Text as submitted (before scrubbing)
    pub original_text: String,
    /// Translated text, or the scrubbed text itself on fallback
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    /// Served from the two-tier cache
    pub from_cache: bool,
    /// At least one sensitive-data detector matched
    pub had_sensitive_data: bool,
    /// Passed through untranslated because the provider could not translate it
    pub fallback: bool,
    /// Positions in the request's `texts` this result stands for
    pub source_indices: Vec<usize>,
}

/// Aggregate statistics for one pipeline run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub total_texts: usize,
    pub duplicates_removed: usize,
    pub sensitive_data_removed: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cache_hit_rate: f64,
    pub dictionary_hits: usize,
    pub fallback_count: usize,
    pub processing_time_ms: u64,
    pub average_time_per_text_ms: f64,
    pub pipeline_steps: Vec<String>,
    pub warnings: Vec<String>,
    pub completed_at: String,
}

/// Full response returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub results: Vec<TranslationResult>,
    pub metadata: RunMetadata,
}

impl TranslationResponse {
    /// Translated texts in result order
    pub fn translations(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.translated_text.as_str()).collect()
    }
}
