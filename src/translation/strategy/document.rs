/*!
 * Document strategy.
 *
 * The payload goes to the text extractor first. Providers cap request size,
 * so long text is cut into chunks of at most `chunk_chars` characters,
 * translated concurrently and joined back in document order.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::errors::TranslationError;
use crate::providers::{TextExtractor, TextTranslator};
use crate::resilience::ResiliencePolicy;
use crate::translation::model::{BinaryPayload, ContentType};
use super::{translate_segments, Translation, TranslationStrategy};

#[derive(Debug, Clone)]
pub struct DocumentStrategy {
    extractor: Arc<dyn TextExtractor>,
    translator: Arc<dyn TextTranslator>,
    extract_policy: ResiliencePolicy,
    translate_policy: ResiliencePolicy,
    chunk_chars: usize,
    concurrency: usize,
}

impl DocumentStrategy {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        translator: Arc<dyn TextTranslator>,
        extract_policy: ResiliencePolicy,
        translate_policy: ResiliencePolicy,
        chunk_chars: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            extractor,
            translator,
            extract_policy,
            translate_policy,
            chunk_chars: chunk_chars.max(1),
            concurrency,
        }
    }

    /// Translate a text of any length chunk by chunk
    async fn translate_large_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Translation {
        let chunks = split_into_chunks(text, self.chunk_chars);
        debug!("Translating document text in {} chunk(s)", chunks.len());

        let translated = translate_segments(
            self.translator.as_ref(),
            &self.translate_policy,
            self.concurrency,
            &chunks,
            source_language,
            target_language,
        )
        .await;

        let fallback = translated.iter().any(|chunk| chunk.fallback);
        let text: String = translated.into_iter().map(|chunk| chunk.text).collect();
        Translation { text, fallback }
    }
}

#[async_trait]
impl TranslationStrategy for DocumentStrategy {
    fn content_type(&self) -> ContentType {
        ContentType::Document
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Translation>, TranslationError> {
        info!("Translating {} document texts using DocumentStrategy", texts.len());
        let mut output = Vec::with_capacity(texts.len());
        for text in texts {
            output.push(
                self.translate_large_text(text, source_language, target_language)
                    .await,
            );
        }
        Ok(output)
    }

    async fn translate_binary(
        &self,
        payload: &BinaryPayload,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, TranslationError> {
        info!(
            "Translating {} document of {} bytes using DocumentStrategy",
            payload.media_type,
            payload.len()
        );
        let extractor = self.extractor.as_ref();
        let text = self
            .extract_policy
            .call(move || extractor.extract_text(payload))
            .await?;
        info!("Extracted {} characters from document", text.chars().count());

        Ok(self
            .translate_large_text(&text, source_language, target_language)
            .await)
    }
}

/// Split text into chunks of at most `max_chars` characters.
///
/// A chunk ends after the last line break or space in its second half when
/// there is one, otherwise exactly at the limit. Concatenating the chunks
/// gives back the input.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            let window = &chars[start..end];
            let min_break = max_chars / 2;
            let break_at = window
                .iter()
                .rposition(|c| *c == '\n')
                .filter(|pos| *pos >= min_break)
                .or_else(|| {
                    window
                        .iter()
                        .rposition(|c| c.is_whitespace())
                        .filter(|pos| *pos >= min_break)
                });
            if let Some(pos) = break_at {
                end = start + pos + 1;
            }
        }
        chunks.push(chars[start..end].iter().collect());
        start = end;
    }

    chunks
}
