/*!
 * Request-processing pipeline.
 *
 * A validated request runs through six stages, strictly in this order:
 * 1. **RemoveDuplicates**: keep the first occurrence of each text
 * 2. **RemoveSensitiveData**: redact tax IDs, emails, phones and card numbers
 * 3. **CacheConsult**: resolve items already in the two-tier cache
 * 4. **Translation**: dictionary lookup, then strategy dispatch for the rest
 * 5. **CacheSave**: write new translations back to the cache
 * 6. **RunSummary**: compute and log the run metadata
 *
 * Each stage takes the `PipelineContext` by value and hands it back, so no
 * stage can hold on to state another stage is changing.
 */

use async_trait::async_trait;

use crate::errors::TranslationError;

pub mod cache_stages;
pub mod context;
pub mod dedup;
pub mod orchestrator;
pub mod scrub;
pub mod summary;
pub mod translate;

pub use cache_stages::{CacheConsultStage, CacheSaveStage};
pub use context::PipelineContext;
pub use dedup::DedupStage;
pub use orchestrator::PipelineOrchestrator;
pub use scrub::ScrubStage;
pub use summary::SummaryStage;
pub use translate::TranslateStage;

/// One ordered transformation over the run context
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Name recorded in the run's step list
    fn name(&self) -> &'static str;

    /// Transform the context; an error aborts the run
    async fn process(&self, ctx: PipelineContext) -> Result<PipelineContext, TranslationError>;
}
