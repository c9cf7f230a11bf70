//! Tests for provider settings resolution

use nlsql_providers::{ProviderError, ProviderKind, ProviderSettings, OPENAI_API_KEY_ENV};
use serial_test::serial;

#[test]
#[serial]
fn test_api_key_falls_back_to_environment() {
    std::env::set_var(OPENAI_API_KEY_ENV, "sk-from-env");

    let settings = ProviderSettings::default();
    assert_eq!(settings.resolve_api_key(), Some("sk-from-env".to_string()));
    assert!(settings.build().is_ok());

    std::env::remove_var(OPENAI_API_KEY_ENV);
}

#[test]
#[serial]
fn test_explicit_api_key_wins() {
    std::env::set_var(OPENAI_API_KEY_ENV, "sk-from-env");

    let settings = ProviderSettings {
        api_key: Some("sk-explicit".to_string()),
        ..Default::default()
    };
    assert_eq!(settings.resolve_api_key(), Some("sk-explicit".to_string()));

    std::env::remove_var(OPENAI_API_KEY_ENV);
}

#[test]
#[serial]
fn test_openai_without_key_is_config_error() {
    std::env::remove_var(OPENAI_API_KEY_ENV);

    let err = ProviderSettings::default().build().err().unwrap();
    assert!(matches!(err, ProviderError::ConfigError(msg) if msg.contains(OPENAI_API_KEY_ENV)));
}

#[test]
#[serial]
fn test_ollama_ignores_missing_key() {
    std::env::remove_var(OPENAI_API_KEY_ENV);

    let settings = ProviderSettings {
        kind: ProviderKind::Ollama,
        model: "llama3".to_string(),
        base_url: Some("http://localhost:11434".to_string()),
        ..Default::default()
    };
    assert!(settings.build().is_ok());
}

#[test]
fn test_invalid_ollama_url_rejected() {
    let settings = ProviderSettings {
        kind: ProviderKind::Ollama,
        base_url: Some("localhost:11434".to_string()),
        ..Default::default()
    };
    assert!(matches!(settings.build(), Err(ProviderError::ConfigError(_))));
}
