/*!
 * # TextBridge - validated, cached, privacy-aware text translation
 *
 * A Rust library that translates batches of text, HTML, documents and
 * images between languages through an ordered request-processing pipeline.
 *
 * ## Features
 *
 * - Validator chain that rejects bad requests before any work is done
 * - Deduplication and sensitive-data redaction before texts leave the process
 * - Two-tier cache (in-process LRU in front of SQLite) with read-through promotion
 * - One translation strategy per content type, wrapped in retry and a circuit breaker
 * - Passthrough fallback: a failing provider degrades results, never the request
 * - Providers:
 *   - Ollama (local LLM, text)
 *   - Anthropic API (text and vision)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `validation`: Ordered request validators
 * - `translation`: The request-processing core:
 *   - `translation::model`: Request, result and metadata types
 *   - `translation::strategy`: Content-type strategies and their factory
 *   - `translation::dispatcher`: Strategy dispatch with passthrough fallback
 *   - `translation::pipeline`: The six pipeline stages and the orchestrator
 *   - `translation::service`: `translate` and `translate_binary` entry points
 * - `resilience`: Retry policy and circuit breaker around provider calls
 * - `cache`: Two-tier translation cache
 * - `dictionary`: Curated translations consulted before the provider
 * - `database`: SQLite persistence for the shared cache tier and the dictionary
 * - `language_utils`: Supported language codes
 * - `providers`: Client implementations for the external collaborators:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::extract`: In-process document text extraction
 *   - `providers::mock`: Test double for every capability
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod cache;
pub mod database;
pub mod dictionary;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod resilience;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, supported_languages};
pub use translation::{
    ContentType, RequestOptions, TranslationRequest, TranslationResponse, TranslationService,
};
