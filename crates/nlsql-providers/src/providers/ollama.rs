//! Ollama provider implementation
//!
//! Runs models locally through Ollama's `/api/generate` endpoint, so neither
//! the question nor the schema leaves the machine.

use std::time::Duration;

use async_trait::async_trait;
use nlsql_chain::{LanguageModel, LanguageModelError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::status_error;
use crate::error::ProviderError;

/// Default local Ollama endpoint
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Language model backed by a local Ollama server
pub struct OllamaLanguageModel {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaLanguageModel {
    /// Create a model client for the given server and model
    pub fn new(base_url: String, model: impl Into<String>) -> Result<Self, ProviderError> {
        if base_url.is_empty() {
            return Err(ProviderError::ConfigError(
                "Ollama base URL is required".to_string(),
            ));
        }

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ProviderError::ConfigError(format!(
                "Ollama base URL must start with http:// or https://: {}",
                base_url
            )));
        }

        let model = model.into();
        if model.is_empty() {
            return Err(ProviderError::ConfigError(
                "Ollama model is required".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: 0.0,
        })
    }

    /// Create a model client for the default localhost endpoint
    pub fn with_default_endpoint(model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(OLLAMA_BASE_URL.to_string(), model)
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Result<Self, ProviderError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConfigError(e.to_string()))?;
        Ok(self)
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one non-streaming generate request
    pub async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, ProviderError> {
        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                stop: stop.to_vec(),
            },
        };

        debug!("Sending generate request to Ollama for model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Ollama request failed: {}", e);
                ProviderError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        let body: OllamaGenerateResponse = response.json().await?;
        if !body.done {
            return Err(ProviderError::ParseError(
                "Ollama returned an incomplete response".to_string(),
            ));
        }

        Ok(body.response)
    }
}

#[async_trait]
impl LanguageModel for OllamaLanguageModel {
    async fn generate(&self, prompt: &str, stop: &[String]) -> Result<String, LanguageModelError> {
        self.complete(prompt, stop).await.map_err(Into::into)
    }
}

/// Ollama generate request format
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama sampling options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

/// Ollama generate response format
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_creation() {
        let model = OllamaLanguageModel::with_default_endpoint("mistral").unwrap();
        assert_eq!(model.base_url, OLLAMA_BASE_URL);
        assert_eq!(model.model(), "mistral");
    }

    #[test]
    fn test_ollama_rejects_bad_url() {
        assert!(OllamaLanguageModel::new("".to_string(), "mistral").is_err());
        assert!(OllamaLanguageModel::new("localhost:11434".to_string(), "mistral").is_err());
    }

    #[test]
    fn test_ollama_rejects_empty_model() {
        assert!(OllamaLanguageModel::with_default_endpoint("").is_err());
    }
}
