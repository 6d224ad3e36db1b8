/*!
 * Per-run pipeline state.
 *
 * A `PipelineContext` is built once from a validated request, moved through
 * every stage and consumed by `into_response`. Nothing in it is shared with
 * other runs.
 *
 * Per-item vectors (`unique_texts`, `source_indices`, `processed_texts`,
 * `translated`, `from_cache`, `had_sensitive_data`, `fallback`) are always
 * index-aligned with each other.
 */

use std::time::Instant;

use crate::database::Repository;
use crate::errors::TranslationError;
use crate::translation::model::{
    BinaryPayload, ContentType, RequestOptions, RunMetadata, TranslationRequest,
    TranslationResponse, TranslationResult,
};

/// Working item text standing for a binary payload
pub fn binary_address(payload: &BinaryPayload) -> String {
    format!("binary:{}", Repository::hash_bytes(&payload.bytes))
}

#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub content_type: ContentType,
    pub source_language: String,
    pub target_language: String,
    pub options: RequestOptions,
    pub payload: Option<BinaryPayload>,

    /// Texts as submitted, duplicates included
    pub original_texts: Vec<String>,
    /// Distinct texts before scrubbing
    pub unique_texts: Vec<String>,
    /// Positions in `original_texts` each item stands for
    pub source_indices: Vec<Vec<usize>>,
    /// Texts sent to the cache and the translator
    pub processed_texts: Vec<String>,
    /// `None` until the item is resolved
    pub translated: Vec<Option<String>>,
    pub from_cache: Vec<bool>,
    pub had_sensitive_data: Vec<bool>,
    pub fallback: Vec<bool>,

    pub duplicates_removed: usize,
    pub sensitive_data_removed: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub dictionary_hits: usize,

    /// Validator and stage warnings
    pub warnings: Vec<String>,
    /// Stage names, in execution order
    pub steps: Vec<String>,
    pub started_at: Instant,
    /// Set by the summary stage
    pub summary: Option<RunMetadata>,
}

impl PipelineContext {
    /// Build the initial state of a run.
    ///
    /// Binary requests get a single item addressed by the payload hash.
    pub fn from_request(request: &TranslationRequest, warnings: Vec<String>) -> Self {
        let content_type = request.content_type.unwrap_or(ContentType::Text);
        let texts = match (&request.payload, content_type.is_binary()) {
            (Some(payload), true) => vec![binary_address(payload)],
            _ => request.texts.clone(),
        };
        let len = texts.len();

        Self {
            content_type,
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
            options: request.options,
            payload: request.payload.clone(),
            original_texts: texts.clone(),
            unique_texts: texts.clone(),
            source_indices: (0..len).map(|i| vec![i]).collect(),
            processed_texts: texts,
            translated: vec![None; len],
            from_cache: vec![false; len],
            had_sensitive_data: vec![false; len],
            fallback: vec![false; len],
            duplicates_removed: 0,
            sensitive_data_removed: 0,
            cache_hits: 0,
            cache_misses: 0,
            dictionary_hits: 0,
            warnings,
            steps: Vec::new(),
            started_at: Instant::now(),
            summary: None,
        }
    }

    /// Number of working items
    pub fn len(&self) -> usize {
        self.processed_texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed_texts.is_empty()
    }

    /// Whether the run carries a binary payload instead of texts
    pub fn is_binary(&self) -> bool {
        self.content_type.is_binary() && self.payload.is_some()
    }

    /// Replace the working set, resetting every per-item vector
    pub fn set_items(&mut self, unique_texts: Vec<String>, source_indices: Vec<Vec<usize>>) {
        let len = unique_texts.len();
        self.processed_texts = unique_texts.clone();
        self.unique_texts = unique_texts;
        self.source_indices = source_indices;
        self.translated = vec![None; len];
        self.from_cache = vec![false; len];
        self.had_sensitive_data = vec![false; len];
        self.fallback = vec![false; len];
    }

    /// Indices still waiting for a translation
    pub fn unresolved(&self) -> Vec<usize> {
        self.translated
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn fallback_count(&self) -> usize {
        self.fallback.iter().filter(|f| **f).count()
    }

    /// Aggregate statistics as of now
    pub fn metadata(&self) -> RunMetadata {
        let total_texts = self.original_texts.len();
        let elapsed = self.started_at.elapsed();
        let processing_time_ms = elapsed.as_millis() as u64;
        let lookups = self.cache_hits + self.cache_misses;

        RunMetadata {
            total_texts,
            duplicates_removed: self.duplicates_removed,
            sensitive_data_removed: self.sensitive_data_removed,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            cache_hit_rate: if lookups == 0 {
                0.0
            } else {
                self.cache_hits as f64 / lookups as f64
            },
            dictionary_hits: self.dictionary_hits,
            fallback_count: self.fallback_count(),
            processing_time_ms,
            average_time_per_text_ms: if total_texts == 0 {
                0.0
            } else {
                elapsed.as_secs_f64() * 1000.0 / total_texts as f64
            },
            pipeline_steps: self.steps.clone(),
            warnings: self.warnings.clone(),
            completed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Project the finished run into a response, one result per item
    pub fn into_response(self) -> Result<TranslationResponse, TranslationError> {
        let metadata = match &self.summary {
            Some(summary) => summary.clone(),
            None => self.metadata(),
        };

        let mut results = Vec::with_capacity(self.len());
        for (i, translated) in self.translated.into_iter().enumerate() {
            let translated_text = translated.ok_or_else(|| {
                TranslationError::failure_msg(format!("Item {} was never translated", i))
            })?;
            results.push(TranslationResult {
                original_text: self.unique_texts[i].clone(),
                translated_text,
                source_language: self.source_language.clone(),
                target_language: self.target_language.clone(),
                from_cache: self.from_cache[i],
                had_sensitive_data: self.had_sensitive_data[i],
                fallback: self.fallback[i],
                source_indices: self.source_indices[i].clone(),
            });
        }

        Ok(TranslationResponse { results, metadata })
    }
}
