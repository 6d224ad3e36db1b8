/*!
 * Translation stage.
 *
 * Only items the cache left unresolved are translated:
 * - a binary run sends its payload through `dispatch_binary`
 * - TEXT misses are looked up in the dictionary first, when one is wired
 * - everything else goes to the content type's strategy in one batch
 *
 * Afterwards every slot holds a value; items the provider could not
 * translate hold their own text and are flagged as fallback.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};

use crate::dictionary::DictionaryStore;
use crate::errors::TranslationError;
use crate::translation::concurrency::map_in_order;
use crate::translation::dispatcher::StrategyDispatcher;
use crate::translation::excerpt;
use crate::translation::model::ContentType;
use super::{PipelineContext, PipelineStage};

#[derive(Debug, Clone)]
pub struct TranslateStage {
    dispatcher: StrategyDispatcher,
    dictionary: Option<Arc<dyn DictionaryStore>>,
    concurrency: usize,
}

impl TranslateStage {
    pub fn new(
        dispatcher: StrategyDispatcher,
        dictionary: Option<Arc<dyn DictionaryStore>>,
        concurrency: usize,
    ) -> Self {
        Self {
            dispatcher,
            dictionary,
            concurrency,
        }
    }

    /// Resolve misses from the dictionary; returns the indices still missing
    async fn consult_dictionary(&self, ctx: &mut PipelineContext, misses: Vec<usize>) -> Vec<usize> {
        let Some(dictionary) = self.dictionary.as_deref() else {
            return misses;
        };
        if ctx.content_type != ContentType::Text || misses.is_empty() {
            return misses;
        }

        let source = ctx.source_language.as_str();
        let target = ctx.target_language.as_str();
        let texts = &ctx.processed_texts;
        let found = map_in_order(&misses, self.concurrency, move |_, &i| async move {
            let text = texts[i].as_str();
            match dictionary.find_translation(text, source, target).await {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Dictionary lookup failed for '{}', treating as miss: {:#}", excerpt(text), e);
                    None
                }
            }
        })
        .await;

        let mut remaining = Vec::new();
        for (i, entry) in misses.into_iter().zip(found) {
            match entry {
                Some(translation) => {
                    debug!("Dictionary hit for '{}'", excerpt(&ctx.processed_texts[i]));
                    ctx.translated[i] = Some(translation);
                    ctx.dictionary_hits += 1;
                }
                None => remaining.push(i),
            }
        }
        remaining
    }

    async fn translate_binary(&self, mut ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        if ctx.unresolved().is_empty() {
            info!("Binary payload served from cache");
            return Ok(ctx);
        }
        let Some(payload) = ctx.payload.as_ref() else {
            return Err(TranslationError::InvalidInput(format!(
                "{} request has no payload",
                ctx.content_type
            )));
        };

        let translation = self
            .dispatcher
            .dispatch_binary(ctx.content_type, payload, &ctx.source_language, &ctx.target_language)
            .await?;
        ctx.fallback[0] = translation.fallback;
        ctx.translated[0] = Some(translation.text);
        Ok(ctx)
    }
}

#[async_trait]
impl PipelineStage for TranslateStage {
    fn name(&self) -> &'static str {
        "Translation"
    }

    async fn process(&self, ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        let mut ctx = if ctx.is_binary() {
            self.translate_binary(ctx).await?
        } else {
            let mut ctx = ctx;
            let misses = ctx.unresolved();
            let misses = self.consult_dictionary(&mut ctx, misses).await;

            if misses.is_empty() {
                info!("Nothing left to translate");
            } else {
                info!("Translating {} of {} {} texts", misses.len(), ctx.len(), ctx.content_type);
                let texts: Vec<String> = misses.iter().map(|&i| ctx.processed_texts[i].clone()).collect();
                let translations = self
                    .dispatcher
                    .dispatch_batch(ctx.content_type, &texts, &ctx.source_language, &ctx.target_language)
                    .await?;

                for (i, translation) in misses.into_iter().zip(translations) {
                    ctx.fallback[i] = translation.fallback;
                    ctx.translated[i] = Some(translation.text);
                }
            }
            ctx
        };

        let unresolved = ctx.unresolved();
        if !unresolved.is_empty() {
            error!("{} items left untranslated after dispatch", unresolved.len());
            return Err(TranslationError::failure_msg(format!(
                "{} items left untranslated",
                unresolved.len()
            )));
        }

        let fallbacks = ctx.fallback_count();
        if fallbacks > 0 {
            warn!("{} items passed through untranslated", fallbacks);
            ctx.warnings
                .push(format!("{} items could not be translated and were passed through", fallbacks));
        }
        Ok(ctx)
    }
}
