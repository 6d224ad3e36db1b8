/*!
 * Translation strategies, one per content type.
 *
 * - `text`: plain texts, one provider call per text
 * - `document`: extraction, then chunked translation in document order
 * - `html`: visible text and selected attributes, markup left untouched
 * - `image`: single extract-and-translate call to a vision provider
 *
 * Strategies call their collaborators through a `ResiliencePolicy`. A text
 * segment that still fails is passed through untranslated and flagged, so a
 * batch always comes back with one `Translation` per input.
 */

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::app_config::{PipelineSettings, ResilienceConfig};
use crate::errors::TranslationError;
use crate::providers::{TextExtractor, TextTranslator, VisionTranslator};
use crate::resilience::ResiliencePolicy;
use crate::translation::concurrency::map_in_order;
use crate::translation::excerpt;
use crate::translation::model::{BinaryPayload, ContentType};

pub mod document;
pub mod html;
pub mod image;
pub mod text;

pub use document::DocumentStrategy;
pub use html::HtmlStrategy;
pub use image::ImageStrategy;
pub use text::TextStrategy;

/// Outcome for one input of a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// The input was passed through untranslated
    pub fallback: bool,
}

impl Translation {
    pub fn translated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fallback: false,
        }
    }

    pub fn passthrough(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fallback: true,
        }
    }
}

/// Translation behavior for one content type
#[async_trait]
pub trait TranslationStrategy: Send + Sync + Debug {
    /// Content type this strategy handles
    fn content_type(&self) -> ContentType;

    /// Translate texts; the output is index-aligned with `texts`
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Translation>, TranslationError>;

    /// Translate a binary payload into one text
    async fn translate_binary(
        &self,
        _payload: &BinaryPayload,
        _source_language: &str,
        _target_language: &str,
    ) -> Result<Translation, TranslationError> {
        Err(TranslationError::InvalidInput(format!(
            "{} content has no binary mode",
            self.content_type()
        )))
    }
}

/// External collaborators the strategies are built from
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub translator: Arc<dyn TextTranslator>,
    pub extractor: Arc<dyn TextExtractor>,
    pub vision: Arc<dyn VisionTranslator>,
}

/// Content type -> strategy, built once at startup
#[derive(Debug, Clone, Default)]
pub struct StrategyFactory {
    strategies: HashMap<ContentType, Arc<dyn TranslationStrategy>>,
}

impl StrategyFactory {
    /// Key every strategy by the content type it declares
    pub fn new(strategies: Vec<Arc<dyn TranslationStrategy>>) -> Self {
        let mut map: HashMap<ContentType, Arc<dyn TranslationStrategy>> = HashMap::new();
        for strategy in strategies {
            let content_type = strategy.content_type();
            if map.insert(content_type, strategy).is_some() {
                warn!("Replacing previously registered {} strategy", content_type);
            }
        }
        Self { strategies: map }
    }

    /// Strategies for all four content types.
    ///
    /// Text, HTML and document translation share one policy for the text
    /// translator; extraction and vision get their own breakers.
    pub fn standard(
        collaborators: &Collaborators,
        resilience: &ResilienceConfig,
        settings: &PipelineSettings,
    ) -> Self {
        let text_policy = ResiliencePolicy::from_config("text-translator", resilience);
        let extract_policy = ResiliencePolicy::from_config("text-extractor", resilience);
        let vision_policy = ResiliencePolicy::from_config("vision-translator", resilience);
        let concurrency = settings.concurrency_limit;

        let strategies: Vec<Arc<dyn TranslationStrategy>> = vec![
            Arc::new(TextStrategy::new(
                collaborators.translator.clone(),
                text_policy.clone(),
                concurrency,
            )),
            Arc::new(HtmlStrategy::new(
                collaborators.translator.clone(),
                text_policy.clone(),
                concurrency,
            )),
            Arc::new(DocumentStrategy::new(
                collaborators.extractor.clone(),
                collaborators.translator.clone(),
                extract_policy,
                text_policy,
                settings.document_chunk_chars,
                concurrency,
            )),
            Arc::new(ImageStrategy::new(collaborators.vision.clone(), vision_policy)),
        ];
        Self::new(strategies)
    }

    /// Strategy for a content type
    pub fn get(&self, content_type: ContentType) -> Result<Arc<dyn TranslationStrategy>, TranslationError> {
        self.strategies
            .get(&content_type)
            .cloned()
            .ok_or(TranslationError::UnsupportedTranslationType(content_type))
    }

    /// Registered content types, in declaration order
    pub fn supported_types(&self) -> Vec<ContentType> {
        ContentType::ALL
            .into_iter()
            .filter(|ct| self.strategies.contains_key(ct))
            .collect()
    }
}

/// Split a text into leading whitespace, core and trailing whitespace
pub(crate) fn split_whitespace(text: &str) -> (&str, &str, &str) {
    let core_start = text.len() - text.trim_start().len();
    let core_end = text.trim_end().len().max(core_start);
    (&text[..core_start], &text[core_start..core_end], &text[core_end..])
}

/// Translate one segment under the policy, keeping its surrounding whitespace.
///
/// Blank segments are returned as they are without a provider call. A
/// failed call passes the segment through untranslated.
pub(crate) async fn translate_segment(
    translator: &dyn TextTranslator,
    policy: &ResiliencePolicy,
    segment: &str,
    source_language: &str,
    target_language: &str,
) -> Translation {
    let (leading, core, trailing) = split_whitespace(segment);
    if core.is_empty() {
        return Translation::translated(segment);
    }

    match policy
        .call(move || translator.translate(core, source_language, target_language))
        .await
    {
        Ok(translated) => {
            debug!("Translated '{}'", excerpt(core));
            Translation::translated(format!("{}{}{}", leading, translated, trailing))
        }
        Err(e) => {
            warn!("Passing '{}' through untranslated: {}", excerpt(core), e);
            Translation::passthrough(segment)
        }
    }
}

/// Translate segments concurrently, output index-aligned with the input
pub(crate) async fn translate_segments(
    translator: &dyn TextTranslator,
    policy: &ResiliencePolicy,
    concurrency: usize,
    segments: &[String],
    source_language: &str,
    target_language: &str,
) -> Vec<Translation> {
    map_in_order(segments, concurrency, |_, segment| {
        translate_segment(translator, policy, segment, source_language, target_language)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    fn collaborators() -> Collaborators {
        let mock = Arc::new(MockProvider::working());
        Collaborators {
            translator: mock.clone(),
            extractor: mock.clone(),
            vision: mock,
        }
    }

    #[test]
    fn test_standard_shouldCoverEveryContentType() {
        let factory = StrategyFactory::standard(
            &collaborators(),
            &ResilienceConfig::default(),
            &PipelineSettings::default(),
        );
        assert_eq!(factory.supported_types(), ContentType::ALL.to_vec());
        for content_type in ContentType::ALL {
            assert_eq!(factory.get(content_type).unwrap().content_type(), content_type);
        }
    }

    #[test]
    fn test_get_withUnregisteredType_shouldFail() {
        let mock = Arc::new(MockProvider::working());
        let text: Arc<dyn TranslationStrategy> = Arc::new(TextStrategy::new(
            mock,
            ResiliencePolicy::from_config("t", &ResilienceConfig::default()),
            1,
        ));
        let factory = StrategyFactory::new(vec![text]);
        assert!(matches!(
            factory.get(ContentType::Image),
            Err(TranslationError::UnsupportedTranslationType(ContentType::Image))
        ));
    }

    #[test]
    fn test_splitWhitespace_shouldSeparateCore() {
        assert_eq!(split_whitespace("  Hello \n"), ("  ", "Hello", " \n"));
        assert_eq!(split_whitespace("   "), ("   ", "", ""));
        assert_eq!(split_whitespace("x"), ("", "x", ""));
    }

    #[tokio::test]
    async fn test_translateSegment_shouldKeepSurroundingWhitespace() {
        let mock = MockProvider::working();
        let policy = ResiliencePolicy::from_config("t", &ResilienceConfig::default());
        let result = translate_segment(&mock, &policy, "\n  Hi ", "en", "pt").await;
        assert_eq!(result, Translation::translated("\n  [TRANSLATED to pt] Hi "));

        let blank = translate_segment(&mock, &policy, "  ", "en", "pt").await;
        assert_eq!(blank, Translation::translated("  "));
        assert_eq!(mock.request_count(), 1);
    }
}
