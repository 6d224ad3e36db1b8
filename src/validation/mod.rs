/*!
 * Request validation.
 *
 * A request passes through an ordered list of validators before any
 * pipeline work starts. The chain stops at the first failing check.
 *
 * # Architecture
 *
 * - `required`: texts, languages and content type are present
 * - `size`: text count, text length and payload size limits
 * - `language`: supported language pair
 * - `format`: content-type specific rules (payloads, HTML markup)
 *
 * Validators never modify the request. A passing validator may return
 * warnings, which end up in the response metadata.
 */

use log::{debug, info};

use crate::errors::TranslationError;
use crate::translation::model::TranslationRequest;

pub mod format;
pub mod language;
pub mod required;
pub mod size;

pub use format::FormatValidator;
pub use language::LanguageValidator;
pub use required::RequiredFieldsValidator;
pub use size::SizeValidator;

/// One check of the validator chain
pub trait RequestValidator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Check the request; `Ok` carries non-fatal warnings
    fn validate(&self, request: &TranslationRequest) -> Result<Vec<String>, TranslationError>;
}

/// Ordered validators with early exit on the first error
pub struct ValidatorChain {
    validators: Vec<Box<dyn RequestValidator>>,
}

impl ValidatorChain {
    /// Chain from an explicit list, run in list order
    pub fn new(validators: Vec<Box<dyn RequestValidator>>) -> Self {
        Self { validators }
    }

    /// Required fields, size, language, format
    pub fn standard() -> Self {
        let validators: Vec<Box<dyn RequestValidator>> = vec![
            Box::new(RequiredFieldsValidator),
            Box::new(SizeValidator::default()),
            Box::new(LanguageValidator),
            Box::new(FormatValidator),
        ];
        Self::new(validators)
    }

    /// Validator names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every validator in order and collect warnings
    pub fn validate(&self, request: &TranslationRequest) -> Result<Vec<String>, TranslationError> {
        let mut warnings = Vec::new();
        for validator in &self.validators {
            debug!("Running validator '{}'", validator.name());
            warnings.extend(validator.validate(request)?);
        }
        info!("Request passed {} validators", self.validators.len());
        Ok(warnings)
    }
}

impl Default for ValidatorChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorChain")
            .field("validators", &self.names())
            .finish()
    }
}
