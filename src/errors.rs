/*!
 * Error types for the textbridge library.
 *
 * Provider failures are described by `ProviderError`; everything the
 * request-processing core can surface to a caller is a `TranslationError`.
 * Both are defined with the thiserror crate.
 */

use thiserror::Error;

use crate::translation::model::ContentType;

/// Errors that can occur when calling an external collaborator
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not complete within its time budget
    #[error("Call timed out after {0} ms")]
    Timeout(u64),

    /// The collaborator cannot handle this input
    #[error("Unsupported input: {0}")]
    Unsupported(String),
}

/// Errors surfaced by the translation core
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Malformed, missing or oversized request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Language code outside the supported set, or source equal to target
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// No strategy is registered for the content type
    #[error("Unsupported translation type: {0}")]
    UnsupportedTranslationType(ContentType),

    /// Provider failure that could not be absorbed
    #[error("Translation failed: {message}")]
    TranslationFailure {
        /// Description of what failed
        message: String,
        /// Underlying provider error, if any
        #[source]
        source: Option<ProviderError>,
    },
}

impl TranslationError {
    /// Build a failure that wraps a provider error
    pub fn failure(message: impl Into<String>, source: ProviderError) -> Self {
        Self::TranslationFailure {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Build a failure without an underlying provider error
    pub fn failure_msg(message: impl Into<String>) -> Self {
        Self::TranslationFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Whether the error was caused by the request itself (never retried)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnsupportedLanguage(_))
    }
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        Self::failure("provider call failed", error)
    }
}
