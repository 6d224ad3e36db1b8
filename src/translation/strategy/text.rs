use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::errors::TranslationError;
use crate::providers::TextTranslator;
use crate::resilience::ResiliencePolicy;
use crate::translation::model::ContentType;
use super::{translate_segments, Translation, TranslationStrategy};

/// Plain text: one provider call per text
#[derive(Debug, Clone)]
pub struct TextStrategy {
    translator: Arc<dyn TextTranslator>,
    policy: ResiliencePolicy,
    concurrency: usize,
}

impl TextStrategy {
    pub fn new(translator: Arc<dyn TextTranslator>, policy: ResiliencePolicy, concurrency: usize) -> Self {
        Self {
            translator,
            policy,
            concurrency,
        }
    }
}

#[async_trait]
impl TranslationStrategy for TextStrategy {
    fn content_type(&self) -> ContentType {
        ContentType::Text
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Translation>, TranslationError> {
        info!("Translating {} texts using TextStrategy", texts.len());
        Ok(translate_segments(
            self.translator.as_ref(),
            &self.policy,
            self.concurrency,
            texts,
            source_language,
            target_language,
        )
        .await)
    }
}
