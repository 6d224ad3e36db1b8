/*!
 * Translation service: the two entry points callers use.
 *
 * - `translate`: TEXT and HTML requests
 * - `translate_binary`: DOCUMENT and IMAGE requests
 *
 * Both run the validator chain first; a rejected request never reaches the
 * pipeline.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

use crate::app_config::{CacheConfig, Config, PipelineSettings, ProviderConfig, ProviderKind, ResilienceConfig};
use crate::cache::{SqliteSharedTier, TranslationCache, TwoTierCache};
use crate::database::{DatabaseConnection, Repository};
use crate::dictionary::{DictionaryStore, SqliteDictionary};
use crate::errors::TranslationError;
use crate::providers::anthropic::Anthropic;
use crate::providers::extract::BasicExtractor;
use crate::providers::mock::MockProvider;
use crate::providers::ollama::Ollama;
use crate::providers::{TextTranslator, VisionTranslator};
use crate::translation::dispatcher::StrategyDispatcher;
use crate::translation::model::{ContentType, TranslationRequest, TranslationResponse};
use crate::translation::pipeline::{PipelineContext, PipelineOrchestrator};
use crate::translation::strategy::{Collaborators, StrategyFactory};
use crate::validation::ValidatorChain;

#[derive(Debug)]
pub struct TranslationService {
    validator: ValidatorChain,
    orchestrator: PipelineOrchestrator,
    supported_types: Vec<ContentType>,
}

impl TranslationService {
    pub fn new(validator: ValidatorChain, orchestrator: PipelineOrchestrator) -> Self {
        Self {
            validator,
            orchestrator,
            supported_types: ContentType::ALL.to_vec(),
        }
    }

    /// Standard validators and stages around the given collaborators
    pub fn with_collaborators(
        collaborators: &Collaborators,
        cache: Option<Arc<dyn TranslationCache>>,
        dictionary: Option<Arc<dyn DictionaryStore>>,
        resilience: &ResilienceConfig,
        settings: &PipelineSettings,
    ) -> Self {
        let factory = StrategyFactory::standard(collaborators, resilience, settings);
        let supported_types = factory.supported_types();
        let dictionary = if settings.use_dictionary { dictionary } else { None };
        let orchestrator = PipelineOrchestrator::standard(
            StrategyDispatcher::new(factory),
            cache,
            dictionary,
            settings.concurrency_limit,
        );
        Self {
            validator: ValidatorChain::standard(),
            orchestrator,
            supported_types,
        }
    }

    /// Build providers, cache and dictionary from the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let collaborators = Collaborators {
            translator: build_translator(&config.provider),
            extractor: Arc::new(BasicExtractor::new()),
            vision: build_vision(&config.vision)?,
        };

        let needs_store = config.cache.enabled || config.pipeline.use_dictionary;
        let repository = if needs_store {
            Some(open_repository(config)?)
        } else {
            None
        };

        let cache = match &repository {
            Some(repository) if config.cache.enabled => Some(build_cache(&config.cache, repository.clone())),
            _ => None,
        };
        let dictionary: Option<Arc<dyn DictionaryStore>> = match &repository {
            Some(repository) if config.pipeline.use_dictionary => {
                let dictionary: Arc<dyn DictionaryStore> = Arc::new(SqliteDictionary::new(repository.clone()));
                Some(dictionary)
            }
            _ => None,
        };

        info!(
            "Translation service ready: {} text provider, {} vision provider, cache {}",
            config.provider.kind,
            config.vision.kind,
            if cache.is_some() { "on" } else { "off" }
        );

        Ok(Self::with_collaborators(
            &collaborators,
            cache,
            dictionary,
            &config.resilience,
            &config.pipeline,
        ))
    }

    /// Translate TEXT or HTML content
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, TranslationError> {
        let warnings = self.validator.validate(request)?;
        if request.is_binary() {
            return Err(TranslationError::InvalidInput(
                "DOCUMENT and IMAGE content must go through translate_binary".to_string(),
            ));
        }
        self.run(request, warnings).await
    }

    /// Translate a DOCUMENT or IMAGE payload
    pub async fn translate_binary(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TranslationError> {
        let warnings = self.validator.validate(request)?;
        if !request.is_binary() {
            return Err(TranslationError::InvalidInput(
                "TEXT and HTML content must go through translate".to_string(),
            ));
        }
        self.run(request, warnings).await
    }

    /// Content types with a registered strategy
    pub fn supported_types(&self) -> &[ContentType] {
        &self.supported_types
    }

    /// Stage names of the pipeline, in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.orchestrator.stage_names()
    }

    async fn run(
        &self,
        request: &TranslationRequest,
        warnings: Vec<String>,
    ) -> Result<TranslationResponse, TranslationError> {
        for warning in &warnings {
            warn!("{}", warning);
        }
        let ctx = PipelineContext::from_request(request, warnings);
        let ctx = self.orchestrator.run(ctx).await?;
        ctx.into_response()
    }
}

fn build_translator(config: &ProviderConfig) -> Arc<dyn TextTranslator> {
    match config.kind {
        ProviderKind::Ollama => Arc::new(Ollama::new(
            config.get_endpoint(),
            config.get_model(),
            config.timeout_secs,
        )),
        ProviderKind::Anthropic => Arc::new(Anthropic::new(
            config.api_key.clone(),
            config.get_endpoint(),
            config.get_model(),
            config.timeout_secs,
        )),
        ProviderKind::Mock => Arc::new(MockProvider::working()),
    }
}

fn build_vision(config: &ProviderConfig) -> Result<Arc<dyn VisionTranslator>> {
    match config.kind {
        ProviderKind::Anthropic => Ok(Arc::new(Anthropic::new(
            config.api_key.clone(),
            config.get_endpoint(),
            config.get_model(),
            config.timeout_secs,
        ))),
        ProviderKind::Mock => Ok(Arc::new(MockProvider::working())),
        ProviderKind::Ollama => Err(anyhow!("{} has no vision support", config.kind.display_name())),
    }
}

fn open_repository(config: &Config) -> Result<Repository> {
    let connection = match config.shared_store_path() {
        Some(path) => DatabaseConnection::new(&path)
            .with_context(|| format!("Failed to open shared store at {}", path.display()))?,
        None => DatabaseConnection::new_default().context("Failed to open default shared store")?,
    };
    Ok(Repository::new(connection))
}

fn build_cache(config: &CacheConfig, repository: Repository) -> Arc<dyn TranslationCache> {
    let shared = Arc::new(SqliteSharedTier::new(repository, config.shared_ttl_secs));
    Arc::new(TwoTierCache::with_settings(
        config.local_capacity,
        Duration::from_secs(config.local_ttl_secs),
        shared,
    ))
}
