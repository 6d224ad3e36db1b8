// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use textbridge::app_config::{self, Config, ProviderKind};
use textbridge::language_utils::{get_language_name, supported_languages};
use textbridge::translation::{ContentType, RequestOptions, TranslationRequest, TranslationResponse, TranslationService};

/// CLI wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    Anthropic,
    Mock,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ollama => ProviderKind::Ollama,
            CliProvider::Anthropic => ProviderKind::Anthropic,
            CliProvider::Mock => ProviderKind::Mock,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Language pair and feature flags shared by the translation commands
#[derive(Args, Debug, Clone)]
struct RequestArgs {
    /// Source language code (e.g., 'en', 'pt', 'es')
    #[arg(short, long)]
    source_language: String,

    /// Target language code (e.g., 'en', 'pt', 'es')
    #[arg(short, long)]
    target_language: String,

    /// Skip the translation cache for this request
    #[arg(long)]
    no_cache: bool,

    /// Translate repeated texts separately
    #[arg(long)]
    keep_duplicates: bool,

    /// Send texts to the provider without redacting sensitive data
    #[arg(long)]
    keep_sensitive_data: bool,
}

impl RequestArgs {
    fn options(&self, defaults: RequestOptions) -> RequestOptions {
        RequestOptions {
            use_cache: defaults.use_cache && !self.no_cache,
            remove_duplicates: defaults.remove_duplicates && !self.keep_duplicates,
            remove_sensitive_data: defaults.remove_sensitive_data && !self.keep_sensitive_data,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate plain texts
    Text {
        #[command(flatten)]
        request: RequestArgs,

        /// Texts to translate; with --file, one text per line of the file
        #[arg(value_name = "TEXT")]
        texts: Vec<String>,

        /// Read the texts from a file instead
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Translate HTML fragments or documents, keeping the markup
    Html {
        #[command(flatten)]
        request: RequestArgs,

        /// HTML file to translate
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Translate a document (PDF, DOC, DOCX, plain text)
    Document {
        #[command(flatten)]
        request: RequestArgs,

        /// Document file to translate
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Media type; guessed from the file extension when omitted
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Extract and translate the text of an image
    Image {
        #[command(flatten)]
        request: RequestArgs,

        /// Image file to translate
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Media type; guessed from the file extension when omitted
        #[arg(long)]
        media_type: Option<String>,
    },

    /// List the supported language codes
    Languages,

    /// Generate shell completions for textbridge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// TextBridge - validated, cached, privacy-aware text translation
#[derive(Parser, Debug)]
#[command(name = "textbridge")]
#[command(version = "0.1.0")]
#[command(about = "Translate texts, HTML, documents and images through an ordered pipeline")]
#[command(long_about = "TextBridge validates a translation request, removes duplicates, redacts sensitive data,
consults a two-tier cache and translates the rest through the configured provider.

EXAMPLES:
    textbridge text -s en -t pt \"Hello\" \"Hello\" \"world@test.com\"
    textbridge text -s en -t es --file lines.txt
    textbridge html -s en -t fr page.html
    textbridge document -s en -t de report.docx
    textbridge image -s en -t pt screenshot.png
    textbridge languages
    textbridge completions bash > textbridge.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (text only)
    anthropic - Anthropic API (text and images, requires API key)
    mock      - In-process echo provider for dry runs")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Text translation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliProvider>,

    /// Model name to use for text translation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The level is lowered or raised once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "textbridge", &mut std::io::stdout());
            Ok(())
        }
        Commands::Languages => {
            for code in supported_languages() {
                let name = get_language_name(code).unwrap_or_else(|_| code.to_string());
                println!("{}\t{}", code, name);
            }
            Ok(())
        }
        command => {
            let config = load_config(&cli)?;
            let service = TranslationService::from_config(&config)?;
            let response = run_command(&service, command).await?;
            let json = serde_json::to_string_pretty(&response)
                .context("Failed to serialize translation response")?;
            println!("{}", json);
            Ok(())
        }
    }
}

/// Load or create the configuration and apply command-line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(Path::new(&cli.config_path))?;

    if let Some(provider) = &cli.provider {
        let kind: ProviderKind = provider.clone().into();
        if kind != config.provider.kind {
            config.provider = app_config::ProviderConfig::new(kind);
        }
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }

    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_command(service: &TranslationService, command: &Commands) -> Result<TranslationResponse> {
    let request = match command {
        Commands::Text { request, texts, file } => {
            let texts = match file {
                Some(path) => read_lines(path)?,
                None => texts.clone(),
            };
            let base = TranslationRequest::text(texts, &request.source_language, &request.target_language);
            let options = request.options(base.options);
            base.with_options(options)
        }
        Commands::Html { request, path } => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;
            let base = TranslationRequest::html(vec![html], &request.source_language, &request.target_language);
            let options = request.options(base.options);
            base.with_options(options)
        }
        Commands::Document { request, path, media_type } => {
            let bytes = read_bytes(path)?;
            let media_type = resolve_media_type(path, media_type.as_deref(), ContentType::Document)?;
            let base = TranslationRequest::document(
                bytes,
                &media_type,
                &request.source_language,
                &request.target_language,
            );
            let options = request.options(base.options);
            base.with_options(options)
        }
        Commands::Image { request, path, media_type } => {
            let bytes = read_bytes(path)?;
            let media_type = resolve_media_type(path, media_type.as_deref(), ContentType::Image)?;
            let base = TranslationRequest::image(
                bytes,
                &media_type,
                &request.source_language,
                &request.target_language,
            );
            let options = request.options(base.options);
            base.with_options(options)
        }
        Commands::Languages | Commands::Completions { .. } => {
            return Err(anyhow!("Command does not translate anything"));
        }
    };

    info!(
        "Translating {} request from {} to {}",
        request.content_type.map(|ct| ct.as_str()).unwrap_or("unknown"),
        request.source_language,
        request.target_language
    );

    let response = if request.is_binary() {
        service.translate_binary(&request).await
    } else {
        service.translate(&request).await
    };
    response.map_err(|e| anyhow!("Translation failed: {}", e))
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read texts file: {}", path.display()))?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Media type from the flag, or from the file extension
fn resolve_media_type(path: &Path, explicit: Option<&str>, content_type: ContentType) -> Result<String> {
    if let Some(media_type) = explicit {
        return Ok(media_type.to_string());
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let media_type = match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => {
            return Err(anyhow!(
                "Cannot guess the media type of {}; pass --media-type (accepted for {}: {})",
                path.display(),
                content_type,
                content_type.mime_types().join(", ")
            ));
        }
    };
    Ok(media_type.to_string())
}
