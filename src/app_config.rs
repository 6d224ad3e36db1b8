use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles loading, validating and saving the settings that
/// wire providers, the two-tier cache, the resilience policy and the pipeline.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Text translation provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Vision-capable provider used for IMAGE requests
    #[serde(default = "default_vision_provider")]
    pub vision: ProviderConfig,

    /// Two-tier cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Retry and circuit breaker settings
    #[serde(default)]
    pub resilience: ResilienceConfig,

    /// Pipeline settings
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: Anthropic
    Anthropic,
    // @provider: In-process mock, for dry runs and tests
    Mock,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type", default)]
    pub kind: ProviderKind,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds for the HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl ProviderConfig {
    // @param kind: Provider enum
    // @returns: Provider config with defaults
    pub fn new(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Ollama => Self {
                kind,
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
                concurrent_requests: default_concurrent_requests(),
            },
            ProviderKind::Anthropic => Self {
                kind,
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_anthropic_timeout_secs(),
                concurrent_requests: default_concurrent_requests(),
            },
            ProviderKind::Mock => Self {
                kind,
                model: String::new(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
                concurrent_requests: default_concurrent_requests(),
            },
        }
    }

    /// Model name, falling back to the provider default
    pub fn get_model(&self) -> String {
        if !self.model.is_empty() {
            return self.model.clone();
        }
        match self.kind {
            ProviderKind::Ollama => default_ollama_model(),
            ProviderKind::Anthropic => default_anthropic_model(),
            ProviderKind::Mock => "mock".to_string(),
        }
    }

    /// Endpoint, falling back to the provider default
    pub fn get_endpoint(&self) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }
        match self.kind {
            ProviderKind::Ollama => default_ollama_endpoint(),
            ProviderKind::Anthropic => default_anthropic_endpoint(),
            ProviderKind::Mock => String::new(),
        }
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.kind == ProviderKind::Anthropic && self.api_key.is_empty() {
            return Err(anyhow!("API key is required for the Anthropic {} provider", role));
        }
        if self.concurrent_requests == 0 {
            return Err(anyhow!("{} provider concurrent_requests must be at least 1", role));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("{} provider timeout_secs must be at least 1", role));
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(ProviderKind::default())
    }
}

/// Two-tier cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Whether the cache is wired at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of entries held by the local tier
    #[serde(default = "default_local_capacity")]
    pub local_capacity: usize,

    /// Local tier time-to-live in seconds
    #[serde(default = "default_local_ttl_secs")]
    pub local_ttl_secs: u64,

    /// Shared tier time-to-live in seconds
    #[serde(default = "default_shared_ttl_secs")]
    pub shared_ttl_secs: u64,

    /// SQLite file backing the shared tier; defaults to the user data directory
    #[serde(default)]
    pub shared_path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            local_capacity: default_local_capacity(),
            local_ttl_secs: default_local_ttl_secs(),
            shared_ttl_secs: default_shared_ttl_secs(),
            shared_path: None,
        }
    }
}

/// Retry and circuit breaker configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResilienceConfig {
    /// Attempts per provider call, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the second attempt, doubled on each retry
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Per-call timeout in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Failure rate (0, 1] that opens the breaker
    #[serde(default = "default_failure_rate_threshold")]
    pub failure_rate_threshold: f64,

    /// Number of most recent calls the failure rate is computed over
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Calls required in the window before the rate is evaluated
    #[serde(default = "default_minimum_calls")]
    pub minimum_calls: usize,

    /// How long the breaker stays open before probing
    #[serde(default = "default_open_duration_secs")]
    pub open_duration_secs: u64,

    /// Trial calls admitted while half-open
    #[serde(default = "default_half_open_max_calls")]
    pub half_open_max_calls: usize,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            call_timeout_secs: default_call_timeout_secs(),
            failure_rate_threshold: default_failure_rate_threshold(),
            window_size: default_window_size(),
            minimum_calls: default_minimum_calls(),
            open_duration_secs: default_open_duration_secs(),
            half_open_max_calls: default_half_open_max_calls(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineSettings {
    /// Maximum in-flight per-item tasks within a stage
    #[serde(default = "default_concurrent_requests")]
    pub concurrency_limit: usize,

    /// Character budget of a document chunk
    #[serde(default = "default_document_chunk_chars")]
    pub document_chunk_chars: usize,

    /// Resolve TEXT cache misses from the dictionary before calling the provider
    #[serde(default = "default_true")]
    pub use_dictionary: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrent_requests(),
            document_chunk_chars: default_document_chunk_chars(),
            use_dictionary: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_vision_provider() -> ProviderConfig {
    ProviderConfig::new(ProviderKind::Anthropic)
}

fn default_local_capacity() -> usize {
    10_000
}

fn default_local_ttl_secs() -> u64 {
    3_600
}

fn default_shared_ttl_secs() -> u64 {
    86_400
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_max_ms() -> u64 {
    8_000
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_failure_rate_threshold() -> f64 {
    0.5
}

fn default_window_size() -> usize {
    20
}

fn default_minimum_calls() -> usize {
    5
}

fn default_open_duration_secs() -> u64 {
    30
}

fn default_half_open_max_calls() -> usize {
    1
}

fn default_document_chunk_chars() -> usize {
    5_000
}

impl Config {
    /// Load the configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the configuration, writing the defaults first when the file is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::from_file(path);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.provider.validate("text")?;
        if self.vision.kind == ProviderKind::Ollama {
            return Err(anyhow!("Ollama cannot be used as the vision provider"));
        }
        self.vision.validate("vision")?;

        if self.cache.enabled {
            if self.cache.local_capacity == 0 {
                return Err(anyhow!("cache.local_capacity must be at least 1"));
            }
            if self.cache.local_ttl_secs == 0 || self.cache.shared_ttl_secs == 0 {
                return Err(anyhow!("cache TTLs must be at least 1 second"));
            }
        }

        let r = &self.resilience;
        if r.max_attempts == 0 {
            return Err(anyhow!("resilience.max_attempts must be at least 1"));
        }
        if r.failure_rate_threshold <= 0.0 || r.failure_rate_threshold > 1.0 {
            return Err(anyhow!(
                "resilience.failure_rate_threshold must be in (0, 1], got {}",
                r.failure_rate_threshold
            ));
        }
        if r.window_size == 0 || r.minimum_calls == 0 || r.half_open_max_calls == 0 {
            return Err(anyhow!("resilience window_size, minimum_calls and half_open_max_calls must be at least 1"));
        }
        if r.minimum_calls > r.window_size {
            return Err(anyhow!("resilience.minimum_calls cannot exceed window_size"));
        }
        if r.call_timeout_secs == 0 {
            return Err(anyhow!("resilience.call_timeout_secs must be at least 1"));
        }

        if self.pipeline.concurrency_limit == 0 {
            return Err(anyhow!("pipeline.concurrency_limit must be at least 1"));
        }
        if self.pipeline.document_chunk_chars == 0 {
            return Err(anyhow!("pipeline.document_chunk_chars must be at least 1"));
        }

        Ok(())
    }

    /// SQLite file of the shared cache tier and the dictionary
    pub fn shared_store_path(&self) -> Option<PathBuf> {
        self.cache.shared_path.clone()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: ProviderConfig::default(),
            vision: default_vision_provider(),
            cache: CacheConfig::default(),
            resilience: ResilienceConfig::default(),
            pipeline: PipelineSettings::default(),
            log_level: LogLevel::default(),
        }
    }
}
