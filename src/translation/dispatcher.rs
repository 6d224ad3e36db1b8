/*!
 * Strategy dispatch with passthrough fallback.
 *
 * The dispatcher picks the strategy for a content type and turns any
 * strategy failure into untranslated, flagged output. The only error that
 * escapes is a missing strategy, which is a wiring bug rather than a
 * request problem.
 */

use log::{debug, warn};

use crate::errors::TranslationError;
use crate::translation::model::{BinaryPayload, ContentType};
use crate::translation::strategy::{StrategyFactory, Translation};

#[derive(Debug, Clone)]
pub struct StrategyDispatcher {
    factory: StrategyFactory,
}

impl StrategyDispatcher {
    pub fn new(factory: StrategyFactory) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &StrategyFactory {
        &self.factory
    }

    /// Translate texts of one content type; output is index-aligned with `texts`
    pub async fn dispatch_batch(
        &self,
        content_type: ContentType,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Translation>, TranslationError> {
        let strategy = self.factory.get(content_type)?;
        debug!("Dispatching {} {} texts", texts.len(), content_type);

        match strategy
            .translate_batch(texts, source_language, target_language)
            .await
        {
            Ok(output) if output.len() == texts.len() => Ok(output),
            Ok(output) => {
                warn!(
                    "{} strategy returned {} translations for {} texts, passing the batch through",
                    content_type,
                    output.len(),
                    texts.len()
                );
                Ok(passthrough_all(texts))
            }
            Err(e) => {
                warn!("{} strategy failed, passing {} texts through: {}", content_type, texts.len(), e);
                Ok(passthrough_all(texts))
            }
        }
    }

    /// Translate one binary payload
    pub async fn dispatch_binary(
        &self,
        content_type: ContentType,
        payload: &BinaryPayload,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, TranslationError> {
        let strategy = self.factory.get(content_type)?;
        debug!("Dispatching {} payload of {} bytes", content_type, payload.len());

        match strategy
            .translate_binary(payload, source_language, target_language)
            .await
        {
            Ok(translation) => Ok(translation),
            Err(e) => {
                warn!("{} strategy failed on binary payload, passing it through: {}", content_type, e);
                Ok(Translation::passthrough(binary_fallback_text(payload)))
            }
        }
    }
}

fn passthrough_all(texts: &[String]) -> Vec<Translation> {
    texts.iter().map(|text| Translation::passthrough(text.as_str())).collect()
}

/// Payload as UTF-8 text when it is valid, otherwise empty
pub fn binary_fallback_text(payload: &BinaryPayload) -> String {
    String::from_utf8(payload.bytes.clone()).unwrap_or_default()
}
