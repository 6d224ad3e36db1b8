/*!
 * Cache consult and cache save stages.
 *
 * Both stages key items with `cache_key(source, target, processed text)`.
 * Cache errors are logged and count as misses; they never fail a run. With
 * no cache wired, or `use_cache` off, every item is a miss and nothing is
 * written.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::cache::{cache_key, TranslationCache};
use crate::errors::TranslationError;
use crate::translation::concurrency::map_in_order;
use crate::translation::excerpt;
use super::{PipelineContext, PipelineStage};

fn active_cache<'a>(
    cache: &'a Option<Arc<dyn TranslationCache>>,
    ctx: &PipelineContext,
) -> Option<&'a dyn TranslationCache> {
    if !ctx.options.use_cache {
        return None;
    }
    cache.as_deref()
}

#[derive(Debug, Clone)]
pub struct CacheConsultStage {
    cache: Option<Arc<dyn TranslationCache>>,
    concurrency: usize,
}

impl CacheConsultStage {
    pub fn new(cache: Option<Arc<dyn TranslationCache>>, concurrency: usize) -> Self {
        Self { cache, concurrency }
    }
}

#[async_trait]
impl PipelineStage for CacheConsultStage {
    fn name(&self) -> &'static str {
        "CacheConsult"
    }

    async fn process(&self, mut ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        let len = ctx.len();
        ctx.translated = vec![None; len];
        ctx.from_cache = vec![false; len];

        let Some(cache) = active_cache(&self.cache, &ctx) else {
            ctx.cache_hits = 0;
            ctx.cache_misses = len;
            info!("Cache not in use, {} misses", len);
            return Ok(ctx);
        };

        let source = ctx.source_language.as_str();
        let target = ctx.target_language.as_str();
        let lookups = map_in_order(&ctx.processed_texts, self.concurrency, move |_, text| async move {
            match cache.get(&cache_key(source, target, text)).await {
                Ok(hit) => hit,
                Err(e) => {
                    warn!("Cache lookup failed for '{}', treating as miss: {:#}", excerpt(text), e);
                    None
                }
            }
        })
        .await;

        let mut hits = 0;
        for (i, lookup) in lookups.into_iter().enumerate() {
            if let Some(value) = lookup {
                debug!("Cache hit for '{}'", excerpt(&ctx.processed_texts[i]));
                ctx.translated[i] = Some(value);
                ctx.from_cache[i] = true;
                hits += 1;
            }
        }
        ctx.cache_hits = hits;
        ctx.cache_misses = len - hits;

        info!("Cache consult: {} hits, {} misses", ctx.cache_hits, ctx.cache_misses);
        Ok(ctx)
    }
}

#[derive(Debug, Clone)]
pub struct CacheSaveStage {
    cache: Option<Arc<dyn TranslationCache>>,
    concurrency: usize,
}

impl CacheSaveStage {
    pub fn new(cache: Option<Arc<dyn TranslationCache>>, concurrency: usize) -> Self {
        Self { cache, concurrency }
    }
}

#[async_trait]
impl PipelineStage for CacheSaveStage {
    fn name(&self) -> &'static str {
        "CacheSave"
    }

    async fn process(&self, ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        let Some(cache) = active_cache(&self.cache, &ctx) else {
            debug!("Cache not in use, nothing saved");
            return Ok(ctx);
        };

        // Cached items are never rewritten; passthroughs are never cached
        let entries: Vec<(&str, &str)> = (0..ctx.len())
            .filter(|&i| !ctx.from_cache[i] && !ctx.fallback[i])
            .filter_map(|i| {
                ctx.translated[i]
                    .as_deref()
                    .map(|value| (ctx.processed_texts[i].as_str(), value))
            })
            .collect();

        let source = ctx.source_language.as_str();
        let target = ctx.target_language.as_str();
        let saved = map_in_order(entries, self.concurrency, move |_, (text, value)| async move {
            match cache.put(&cache_key(source, target, text), value).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Cache write failed for '{}': {:#}", excerpt(text), e);
                    false
                }
            }
        })
        .await;

        let saved_count = saved.iter().filter(|ok| **ok).count();
        info!("Saved {} new translations to cache", saved_count);
        Ok(ctx)
    }
}
