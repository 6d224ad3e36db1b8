/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock that implements all three provider
 * capabilities and simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::fail_matching(..)` - Fails only for texts containing a needle
 * - `MockProvider::intermittent(n)` - Fails every n-th call
 * - `MockProvider::slow(ms)` - Succeeds after a delay
 * - `MockProvider::empty()` - Succeeds with an empty string
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{TextExtractor, TextTranslator, VisionTranslator};
use crate::translation::model::BinaryPayload;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Always fails with an error
    Failing,
    /// Fails for inputs containing the needle, succeeds otherwise
    FailMatching { needle: String },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
    /// Returns empty response
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every input seen, in call order
    calls: Arc<Mutex<Vec<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str, &str, &str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a provider failing only on inputs containing `needle`
    pub fn fail_matching(needle: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailMatching {
            needle: needle.into(),
        })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator taking `(text, source, target)`
    pub fn with_custom_response(mut self, generator: fn(&str, &str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of calls made so far, across clones
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Inputs seen so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Translation produced by the working behavior
    pub fn expected_translation(text: &str, target_language: &str) -> String {
        format!("[TRANSLATED to {}] {}", target_language, text)
    }

    async fn respond(
        &self,
        input: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(input.to_string());

        let success = || match self.custom_response {
            Some(generator) => generator(input, source_language, target_language),
            None => Self::expected_translation(input, target_language),
        };

        match &self.behavior {
            MockBehavior::Working => Ok(success()),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailMatching { needle } => {
                if input.contains(needle.as_str()) {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated failure for input containing '{}'", needle),
                        status_code: 503,
                    })
                } else {
                    Ok(success())
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(success())
                }
            }

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(success())
            }

            MockBehavior::Empty => Ok(String::new()),
        }
    }
}

#[async_trait]
impl TextTranslator for MockProvider {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.respond(text, source_language, target_language).await
    }
}

#[async_trait]
impl TextExtractor for MockProvider {
    async fn extract_text(&self, payload: &BinaryPayload) -> Result<String, ProviderError> {
        // Extraction echoes the payload and is not counted as a translation call
        let text = String::from_utf8_lossy(&payload.bytes).into_owned();
        match &self.behavior {
            MockBehavior::Failing => Err(ProviderError::Unsupported(
                "Simulated extraction failure".to_string(),
            )),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(text)
            }
            MockBehavior::Empty => Ok(String::new()),
            _ => Ok(text),
        }
    }
}

#[async_trait]
impl VisionTranslator for MockProvider {
    async fn extract_and_translate(
        &self,
        payload: &BinaryPayload,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let description = format!("image {} ({} bytes)", payload.media_type, payload.len());
        self.respond(&description, source_language, target_language).await
    }
}
