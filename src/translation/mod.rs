/*!
 * Request translation core.
 *
 * - `model`: request, result and metadata types
 * - `strategy`: one translation strategy per content type, plus the factory
 * - `dispatcher`: strategy dispatch with passthrough fallback
 * - `pipeline`: the six ordered stages and their orchestrator
 * - `service`: validation + pipeline behind `translate` / `translate_binary`
 * - `concurrency`: bounded, order-preserving per-item execution
 */

pub mod concurrency;
pub mod dispatcher;
pub mod model;
pub mod pipeline;
pub mod service;
pub mod strategy;

pub use dispatcher::StrategyDispatcher;
pub use model::{
    BinaryPayload, ContentType, RequestOptions, RunMetadata, TranslationRequest,
    TranslationResponse, TranslationResult,
};
pub use service::TranslationService;
pub use strategy::{Collaborators, StrategyFactory, Translation, TranslationStrategy};

/// First 50 characters of a text, for log lines
pub(crate) fn excerpt(text: &str) -> String {
    const MAX_CHARS: usize = 50;
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
