// Layered settings: defaults, TOML file, environment, then CLI flags

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use nlsql_chain::ChainConfig;
use nlsql_providers::ProviderSettings;
use nlsql_sqlite::SqliteOptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Environment variable prefix (`NLSQL_CHAIN__MAX_TRIES=3`)
pub const ENV_PREFIX: &str = "NLSQL";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "nlsql.toml";

/// `[database]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file to query
    pub path: Option<PathBuf>,
    /// Only expose these tables
    pub include_tables: Option<Vec<String>>,
    /// Hide these tables
    pub ignore_tables: Option<Vec<String>>,
    /// Sample rows shown per table in the schema
    pub sample_rows_in_table_info: usize,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            include_tables: None,
            ignore_tables: None,
            sample_rows_in_table_info: SqliteOptions::default().sample_rows_in_table_info,
        }
    }
}

impl DatabaseSettings {
    /// Store options for this section
    pub fn sqlite_options(&self) -> SqliteOptions {
        SqliteOptions {
            include_tables: self.include_tables.clone(),
            ignore_tables: self.ignore_tables.clone(),
            sample_rows_in_table_info: self.sample_rows_in_table_info,
        }
    }
}

/// Effective settings for one invocation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level used when neither `--verbose` nor `--quiet` is given
    pub log_level: Option<String>,
    pub chain: ChainConfig,
    pub provider: ProviderSettings,
    pub database: DatabaseSettings,
}

impl Settings {
    /// Check every section
    pub fn validate(&self) -> CliResult<()> {
        self.chain
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;
        self.provider
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if self.database.include_tables.is_some() && self.database.ignore_tables.is_some() {
            return Err(CliError::Config(
                "database.include_tables and database.ignore_tables are mutually exclusive"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Render as TOML with the API key redacted
    pub fn to_redacted_toml(&self) -> CliResult<String> {
        let mut shown = self.clone();
        if shown.provider.api_key.is_some() {
            shown.provider.api_key = Some("********".to_string());
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

/// Loads [`Settings`] from file and environment
pub struct SettingsLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl SettingsLoader {
    /// Create a loader using the default file lookup
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use an explicit config file (must exist)
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Per-user config file
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nlsql")
            .join("config.toml")
    }

    /// Config file to read and whether it must exist
    fn config_file(&self) -> (PathBuf, bool) {
        match &self.config_path {
            Some(path) => (path.clone(), true),
            None => {
                let local = Path::new(LOCAL_CONFIG_FILE);
                if local.exists() {
                    (local.to_path_buf(), false)
                } else {
                    (Self::default_config_path(), false)
                }
            }
        }
    }

    /// Load and validate settings
    pub fn load(&self) -> CliResult<Settings> {
        let settings = self.load_layers()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Merge file and environment layers without validating
    ///
    /// Callers that apply further overrides validate the final result.
    pub fn load_layers(&self) -> CliResult<Settings> {
        let (path, required) = self.config_file();
        debug!(path = %path.display(), required, "Loading settings");

        let config = Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chain.max_tries, 1);
        assert_eq!(settings.chain.top_k, 5);
        assert_eq!(settings.database.sample_rows_in_table_info, 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_conflicting_table_filters_rejected() {
        let mut settings = Settings::default();
        settings.database.include_tables = Some(vec!["orders".to_string()]);
        settings.database.ignore_tables = Some(vec!["products".to_string()]);
        assert!(matches!(settings.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_redacted_toml_hides_key() {
        let mut settings = Settings::default();
        settings.provider.api_key = Some("sk-secret".to_string());

        let rendered = settings.to_redacted_toml().unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[chain]"));
        assert!(rendered.contains("max_tries = 1"));
    }
}
