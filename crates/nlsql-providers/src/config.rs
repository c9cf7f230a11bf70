//! Provider selection and settings

use std::{sync::Arc, time::Duration};

use nlsql_chain::LanguageModel;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ProviderError,
    providers::{
        ollama::OLLAMA_BASE_URL, openai::OPENAI_BASE_URL, OllamaLanguageModel,
        OpenAiLanguageModel,
    },
};

/// Environment variable consulted when no API key is configured
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// OpenAI or an OpenAI-compatible server
    #[serde(rename = "openai")]
    OpenAi,
    /// Local Ollama server
    #[serde(rename = "ollama")]
    Ollama,
}

/// Settings for building a language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Backend to use
    pub kind: ProviderKind,
    /// Model identifier
    pub model: String,
    /// Base URL override (self-hosted or proxy)
    pub base_url: Option<String>,
    /// API key (falls back to `OPENAI_API_KEY`)
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

impl ProviderSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::ConfigError(
                "provider model cannot be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ProviderError::ConfigError(
                "provider timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ProviderError::ConfigError(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        Ok(())
    }

    /// Configured API key, else the `OPENAI_API_KEY` environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }

    /// Effective base URL
    pub fn resolved_base_url(&self) -> String {
        match (&self.base_url, self.kind) {
            (Some(url), _) if !url.is_empty() => url.clone(),
            (_, ProviderKind::OpenAi) => OPENAI_BASE_URL.to_string(),
            (_, ProviderKind::Ollama) => OLLAMA_BASE_URL.to_string(),
        }
    }

    /// Build the configured language model
    pub fn build(&self) -> Result<Arc<dyn LanguageModel>, ProviderError> {
        self.validate()?;
        let base_url = self.resolved_base_url();
        let timeout = Duration::from_secs(self.timeout_secs);
        debug!(
            kind = ?self.kind,
            model = %self.model,
            base_url = %base_url,
            "Building language model"
        );

        match self.kind {
            ProviderKind::OpenAi => {
                let api_key = self.resolve_api_key().ok_or_else(|| {
                    ProviderError::ConfigError(format!(
                        "OpenAI API key is required (set provider.api_key or {})",
                        OPENAI_API_KEY_ENV
                    ))
                })?;
                let model = OpenAiLanguageModel::with_base_url(api_key, &self.model, base_url)?
                    .temperature(self.temperature)
                    .timeout(timeout)?;
                Ok(Arc::new(model))
            }
            ProviderKind::Ollama => {
                let model = OllamaLanguageModel::new(base_url, &self.model)?
                    .temperature(self.temperature)
                    .timeout(timeout)?;
                Ok(Arc::new(model))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        assert!(ProviderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let settings = ProviderSettings {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = ProviderSettings {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_resolved_base_url() {
        let mut settings = ProviderSettings::default();
        assert_eq!(settings.resolved_base_url(), OPENAI_BASE_URL);

        settings.kind = ProviderKind::Ollama;
        assert_eq!(settings.resolved_base_url(), OLLAMA_BASE_URL);

        settings.base_url = Some("http://gpu-box:11434".to_string());
        assert_eq!(settings.resolved_base_url(), "http://gpu-box:11434");
    }

    #[test]
    fn test_build_ollama_needs_no_key() {
        let settings = ProviderSettings {
            kind: ProviderKind::Ollama,
            model: "mistral".to_string(),
            ..Default::default()
        };
        assert!(settings.build().is_ok());
    }

    #[test]
    fn test_build_openai_with_explicit_key() {
        let settings = ProviderSettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(settings.build().is_ok());
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let settings: ProviderSettings =
            serde_json::from_str(r#"{"kind": "ollama", "model": "llama3"}"#).unwrap();
        assert_eq!(settings.kind, ProviderKind::Ollama);
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.timeout_secs, 60);
    }
}
