//! Tests for layered settings loading

use std::fs;

use nlsql_cli::{CliError, SettingsLoader};
use nlsql_providers::ProviderKind;
use serial_test::serial;
use tempfile::TempDir;

const CONFIG: &str = r#"
log_level = "info"

[chain]
max_tries = 2
return_intermediate_steps = true

[provider]
kind = "ollama"
model = "llama3"
base_url = "http://gpu-box:11434"

[database]
path = "shop.db"
ignore_tables = ["audit_log"]
sample_rows_in_table_info = 1
"#;

#[test]
#[serial]
fn test_load_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nlsql.toml");
    fs::write(&path, CONFIG).unwrap();

    let settings = SettingsLoader::with_path(path)
        .with_env_prefix("NLSQL_TEST_FILE")
        .load()
        .unwrap();

    assert_eq!(settings.log_level.as_deref(), Some("info"));
    assert_eq!(settings.chain.max_tries, 2);
    assert_eq!(settings.chain.top_k, 5);
    assert!(settings.chain.return_intermediate_steps);
    assert_eq!(settings.provider.kind, ProviderKind::Ollama);
    assert_eq!(settings.provider.model, "llama3");
    assert_eq!(settings.database.path.as_deref(), Some(std::path::Path::new("shop.db")));
    assert_eq!(
        settings.database.ignore_tables,
        Some(vec!["audit_log".to_string()])
    );
    assert_eq!(settings.database.sample_rows_in_table_info, 1);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nlsql.toml");
    fs::write(&path, CONFIG).unwrap();

    std::env::set_var("NLSQL_TEST_ENV_CHAIN__MAX_TRIES", "4");
    std::env::set_var("NLSQL_TEST_ENV_PROVIDER__MODEL", "mistral");

    let result = SettingsLoader::with_path(path)
        .with_env_prefix("NLSQL_TEST_ENV")
        .load();

    std::env::remove_var("NLSQL_TEST_ENV_CHAIN__MAX_TRIES");
    std::env::remove_var("NLSQL_TEST_ENV_PROVIDER__MODEL");

    let settings = result.unwrap();
    assert_eq!(settings.chain.max_tries, 4);
    assert_eq!(settings.provider.model, "mistral");
    assert_eq!(settings.provider.kind, ProviderKind::Ollama);
}

#[test]
#[serial]
fn test_invalid_values_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nlsql.toml");
    fs::write(&path, "[chain]\nmax_tries = 0\n").unwrap();

    let err = SettingsLoader::with_path(path)
        .with_env_prefix("NLSQL_TEST_INVALID")
        .load()
        .unwrap_err();

    assert!(matches!(err, CliError::Config(msg) if msg.contains("max_tries")));
}

#[test]
#[serial]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();

    let result = SettingsLoader::with_path(dir.path().join("missing.toml"))
        .with_env_prefix("NLSQL_TEST_MISSING")
        .load();

    assert!(matches!(result, Err(CliError::Config(_))));
}
