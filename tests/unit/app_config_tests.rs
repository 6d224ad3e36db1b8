/*!
 * Tests for configuration loading and validation
 */

use textbridge::app_config::{Config, LogLevel, ProviderKind};

use crate::common;

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{ "provider": { "type": "mock" }, "vision": { "type": "mock" }, "log_level": "debug" }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Mock);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.cache.enabled);
    assert_eq!(config.resilience.max_attempts, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());

    let reloaded = Config::from_file(&path).unwrap();
    assert_eq!(reloaded.provider.kind, created.provider.kind);
    assert_eq!(reloaded.cache.local_capacity, created.cache.local_capacity);
}

#[test]
fn test_fromFile_withMalformedJson_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_validate_withMinimumCallsAboveWindow_shouldFail() {
    let mut config = Config {
        provider: textbridge::app_config::ProviderConfig::new(ProviderKind::Mock),
        vision: textbridge::app_config::ProviderConfig::new(ProviderKind::Mock),
        ..Config::default()
    };
    config.resilience.minimum_calls = config.resilience.window_size + 1;
    assert!(config.validate().is_err());
}

#[test]
fn test_providerKind_fromStr_shouldIgnoreCase() {
    assert_eq!("Anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
    assert_eq!("MOCK".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
    assert!("openai".parse::<ProviderKind>().is_err());
}

#[test]
fn test_serviceFromConfig_withoutStore_shouldTranslate() {
    let mut config = Config {
        provider: textbridge::app_config::ProviderConfig::new(ProviderKind::Mock),
        vision: textbridge::app_config::ProviderConfig::new(ProviderKind::Mock),
        ..Config::default()
    };
    config.cache.enabled = false;
    config.pipeline.use_dictionary = false;

    let service = textbridge::TranslationService::from_config(&config).unwrap();
    let request = textbridge::TranslationRequest::text(vec!["Hi".to_string()], "en", "it");

    let response = tokio_test::block_on(async { service.translate(&request).await }).unwrap();
    assert_eq!(response.translations(), vec!["[TRANSLATED to it] Hi"]);
    assert_eq!(response.metadata.cache_misses, 1);
}
