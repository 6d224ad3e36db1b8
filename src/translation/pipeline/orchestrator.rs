/*!
 * Pipeline orchestrator.
 *
 * Owns the stage order and runs the stages one after another, each one
 * finishing the whole batch before the next starts. A stage error aborts the
 * run and is returned as is.
 */

use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info};

use crate::cache::TranslationCache;
use crate::dictionary::DictionaryStore;
use crate::errors::TranslationError;
use crate::translation::dispatcher::StrategyDispatcher;
use super::{
    CacheConsultStage, CacheSaveStage, DedupStage, PipelineContext, PipelineStage, ScrubStage,
    SummaryStage, TranslateStage,
};

/// Ordered stage runner
pub struct PipelineOrchestrator {
    stages: Vec<Box<dyn PipelineStage>>,
}

impl PipelineOrchestrator {
    /// Orchestrator over an explicit stage list, run in list order
    pub fn new(stages: Vec<Box<dyn PipelineStage>>) -> Self {
        Self { stages }
    }

    /// The six standard stages.
    ///
    /// `cache` and `dictionary` are optional; without them every item is a
    /// cache miss and no dictionary lookup happens.
    pub fn standard(
        dispatcher: StrategyDispatcher,
        cache: Option<Arc<dyn TranslationCache>>,
        dictionary: Option<Arc<dyn DictionaryStore>>,
        concurrency: usize,
    ) -> Self {
        let stages: Vec<Box<dyn PipelineStage>> = vec![
            Box::new(DedupStage),
            Box::new(ScrubStage),
            Box::new(CacheConsultStage::new(cache.clone(), concurrency)),
            Box::new(TranslateStage::new(dispatcher, dictionary, concurrency)),
            Box::new(CacheSaveStage::new(cache, concurrency)),
            Box::new(SummaryStage),
        ];
        Self::new(stages)
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage in order over the context
    pub async fn run(&self, mut ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        info!(
            "Starting pipeline: {} {} texts, {} -> {}",
            ctx.len(),
            ctx.content_type,
            ctx.source_language,
            ctx.target_language
        );

        for stage in &self.stages {
            let name = stage.name();
            ctx.steps.push(name.to_string());
            let stage_start = Instant::now();

            ctx = match stage.process(ctx).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    error!("Pipeline stage '{}' failed: {}", name, e);
                    return Err(e);
                }
            };
            debug!("Stage '{}' finished in {:?}", name, stage_start.elapsed());
        }

        Ok(ctx)
    }
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("stages", &self.stage_names())
            .finish()
    }
}
