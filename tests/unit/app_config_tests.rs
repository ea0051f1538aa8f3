/*!
 * Tests for application configuration functionality
 */

use langcache::app_config::{Config, LogLevel, ProviderKind};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "English");
    assert_eq!(config.target_language, "Simplified Chinese");
    assert_eq!(config.oracle.provider, ProviderKind::Ollama);
    assert_eq!(config.oracle.batch_size, 50);
    assert_eq!(config.oracle.timeout_secs, 180);
    assert_eq!(config.oracle.ollama.api_url, "http://localhost:11434/api/generate");
    assert_eq!(config.oracle.api.auth_header, "Authorization");
    assert_eq!(config.server.bind_address(), "127.0.0.1:8000");
    assert_eq!(config.import.source_locale, "en_us");
    assert_eq!(config.import.target_locale, "zh_cn");
    assert!(config.database.path.is_none());
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.target_language = "  ".to_string();
    assert!(config.validate().is_err());
    config.target_language = "Japanese".to_string();

    config.oracle.batch_size = 0;
    assert!(config.validate().is_err());
    config.oracle.batch_size = 10;

    config.oracle.timeout_secs = 0;
    assert!(config.validate().is_err());
    config.oracle.timeout_secs = 30;

    config.oracle.ollama.api_url = "not a url".to_string();
    assert!(config.validate().is_err());

    // Only the active provider's endpoint is checked
    config.oracle.provider = ProviderKind::Api;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withUnsupportedProvider_shouldStillPass() {
    let mut config = Config::default();
    config.oracle.provider = ProviderKind::from("deepl".to_string());

    assert!(config.validate().is_ok());
    assert_eq!(config.oracle.get_model(), "");
}

#[test]
fn test_config_fromJson_withPartialFile_shouldFillDefaults() {
    let json = r#"{
        "target_language": "Japanese",
        "oracle": { "provider": "openai", "api": { "api_key": "sk-test" } }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.source_language, "English");
    assert_eq!(config.target_language, "Japanese");
    assert_eq!(config.oracle.provider, ProviderKind::Api);
    assert_eq!(config.oracle.api.api_key, "sk-test");
    assert_eq!(config.oracle.api.model, "gpt-4o-mini");
    assert_eq!(config.oracle.batch_size, 50);
}

#[test]
fn test_config_roundTrip_withUnknownProvider_shouldKeepName() {
    let mut config = Config::default();
    config.oracle.provider = ProviderKind::from("carrier-pigeon".to_string());

    let json = serde_json::to_string(&config).unwrap();
    let restored: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(
        restored.oracle.provider,
        ProviderKind::Unsupported("carrier-pigeon".to_string())
    );
    assert!(json.contains("\"carrier-pigeon\""));
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.target_language, config.target_language);
    assert_eq!(reloaded.oracle.provider, config.oracle.provider);
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ broken").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_providerKind_display_shouldBeLowercase() {
    assert_eq!(ProviderKind::Api.to_string(), "api");
    assert_eq!(ProviderKind::Ollama.display_name(), "Ollama");
    assert_eq!("OLLAMA".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
}
