//! OpenAI provider implementation
//!
//! Talks to the chat completions endpoint of OpenAI or any server that speaks
//! the same protocol (vLLM, LM Studio, llama.cpp server, ...).

use std::time::Duration;

use async_trait::async_trait;
use nlsql_chain::{LanguageModel, LanguageModelError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::status_error;
use crate::error::ProviderError;

/// Default OpenAI API endpoint
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Language model backed by an OpenAI-compatible chat completions API
pub struct OpenAiLanguageModel {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiLanguageModel {
    /// Create a model client for the public OpenAI API
    pub fn new(api_key: String, model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, model, OPENAI_BASE_URL.to_string())
    }

    /// Create a model client for a custom base URL
    pub fn with_base_url(
        api_key: String,
        model: impl Into<String>,
        base_url: String,
    ) -> Result<Self, ProviderError> {
        if api_key.is_empty() {
            return Err(ProviderError::ConfigError(
                "OpenAI API key is required".to_string(),
            ));
        }

        let model = model.into();
        if model.is_empty() {
            return Err(ProviderError::ConfigError(
                "OpenAI model is required".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: 0.0,
        })
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

    /// Model identifier sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the authorization header value
    fn get_auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Send one completion request
    pub async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, ProviderError> {
        let request = OpenAiChatRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature: self.temperature,
            stop: (!stop.is_empty()).then(|| stop.to_vec()),
        };

        debug!("Sending chat request to OpenAI for model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", self.get_auth_header())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("OpenAI API request failed: {}", e);
                ProviderError::from(e)
            })?;

        if !response.status().is_success() {
            return Err(status_error("OpenAI", response).await);
        }

        let body: OpenAiChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| ProviderError::ParseError("No content in response".to_string()))?;

        if let Some(usage) = body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI token usage"
            );
        }

        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for OpenAiLanguageModel {
    async fn generate(&self, prompt: &str, stop: &[String]) -> Result<String, LanguageModelError> {
        self.complete(prompt, stop).await.map_err(Into::into)
    }
}

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// OpenAI API message format
#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

/// OpenAI API choice format
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
}

/// OpenAI API usage format
#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}
