use async_trait::async_trait;
use log::info;

use crate::errors::TranslationError;
use super::{PipelineContext, PipelineStage};

/// Terminal stage: computes the run metadata and logs it.
///
/// Translation content is left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryStage;

#[async_trait]
impl PipelineStage for SummaryStage {
    fn name(&self) -> &'static str {
        "RunSummary"
    }

    async fn process(&self, mut ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        let metadata = ctx.metadata();
        info!(
            "Run complete: {} texts, {} duplicates removed, {} with sensitive data, \
             cache hit rate {:.1}%, {} dictionary hits, {} fallbacks, {} ms ({:.2} ms/text)",
            metadata.total_texts,
            metadata.duplicates_removed,
            metadata.sensitive_data_removed,
            metadata.cache_hit_rate * 100.0,
            metadata.dictionary_hits,
            metadata.fallback_count,
            metadata.processing_time_ms,
            metadata.average_time_per_text_ms
        );
        ctx.summary = Some(metadata);
        Ok(ctx)
    }
}
