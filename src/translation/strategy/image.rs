use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::errors::TranslationError;
use crate::providers::VisionTranslator;
use crate::resilience::ResiliencePolicy;
use crate::translation::model::{BinaryPayload, ContentType};
use super::{Translation, TranslationStrategy};

/// Image: one combined extract-and-translate call, no text batch mode
#[derive(Debug, Clone)]
pub struct ImageStrategy {
    vision: Arc<dyn VisionTranslator>,
    policy: ResiliencePolicy,
}

impl ImageStrategy {
    pub fn new(vision: Arc<dyn VisionTranslator>, policy: ResiliencePolicy) -> Self {
        Self { vision, policy }
    }
}

#[async_trait]
impl TranslationStrategy for ImageStrategy {
    fn content_type(&self) -> ContentType {
        ContentType::Image
    }

    async fn translate_batch(
        &self,
        _texts: &[String],
        _source_language: &str,
        _target_language: &str,
    ) -> Result<Vec<Translation>, TranslationError> {
        Err(TranslationError::InvalidInput(
            "IMAGE content has no text batch mode".to_string(),
        ))
    }

    async fn translate_binary(
        &self,
        payload: &BinaryPayload,
        source_language: &str,
        target_language: &str,
    ) -> Result<Translation, TranslationError> {
        info!(
            "Translating {} image of {} bytes using ImageStrategy",
            payload.media_type,
            payload.len()
        );
        let vision = self.vision.as_ref();
        let text = self
            .policy
            .call(move || vision.extract_and_translate(payload, source_language, target_language))
            .await?;
        Ok(Translation::translated(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::ResilienceConfig;
    use crate::providers::mock::MockProvider;

    fn strategy(mock: MockProvider) -> ImageStrategy {
        let config = ResilienceConfig {
            max_attempts: 1,
            ..ResilienceConfig::default()
        };
        ImageStrategy::new(Arc::new(mock), ResiliencePolicy::from_config("vision", &config))
    }

    #[tokio::test]
    async fn test_translateBinary_shouldMakeSingleVisionCall() {
        let mock = MockProvider::working();
        let payload = BinaryPayload::new(vec![0u8; 4], "image/png");
        let result = strategy(mock.clone())
            .translate_binary(&payload, "en", "pt")
            .await
            .unwrap();
        assert_eq!(result.text, "[TRANSLATED to pt] image image/png (4 bytes)");
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_translateBinary_withFailingProvider_shouldReturnError() {
        let payload = BinaryPayload::new(vec![0u8; 4], "image/png");
        let result = strategy(MockProvider::failing())
            .translate_binary(&payload, "en", "pt")
            .await;
        assert!(matches!(result, Err(TranslationError::TranslationFailure { .. })));
    }

    #[tokio::test]
    async fn test_translateBatch_shouldBeRejected() {
        let result = strategy(MockProvider::working())
            .translate_batch(&["text".to_string()], "en", "pt")
            .await;
        assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
    }
}
