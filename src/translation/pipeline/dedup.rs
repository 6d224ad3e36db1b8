use std::collections::HashMap;

use async_trait::async_trait;
use log::info;

use crate::errors::TranslationError;
use super::{PipelineContext, PipelineStage};

/// Collapse repeated texts onto their first occurrence.
///
/// Equality is exact; the positions of every occurrence are kept in
/// `source_indices`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DedupStage;

/// Distinct texts in first-seen order, with the positions each one covers
pub fn deduplicate(texts: &[String]) -> (Vec<String>, Vec<Vec<usize>>) {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(texts.len());
    let mut unique = Vec::new();
    let mut indices: Vec<Vec<usize>> = Vec::new();

    for (position, text) in texts.iter().enumerate() {
        match seen.get(text.as_str()) {
            Some(&slot) => indices[slot].push(position),
            None => {
                seen.insert(text.as_str(), unique.len());
                unique.push(text.clone());
                indices.push(vec![position]);
            }
        }
    }

    (unique, indices)
}

#[async_trait]
impl PipelineStage for DedupStage {
    fn name(&self) -> &'static str {
        "RemoveDuplicates"
    }

    async fn process(&self, mut ctx: PipelineContext) -> Result<PipelineContext, TranslationError> {
        if !ctx.options.remove_duplicates {
            info!("Duplicate removal disabled, keeping {} texts", ctx.len());
            return Ok(ctx);
        }

        let (unique, indices) = deduplicate(&ctx.original_texts);
        ctx.duplicates_removed = ctx.original_texts.len() - unique.len();
        ctx.set_items(unique, indices);

        info!(
            "Removed {} duplicates, {} unique texts left",
            ctx.duplicates_removed,
            ctx.len()
        );
        Ok(ctx)
    }
}
