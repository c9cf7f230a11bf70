//! Language model collaborator

use async_trait::async_trait;

use crate::error::LanguageModelError;

/// Generates text from a rendered prompt
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt`, stopping at the first of `stop` if the backend supports it
    async fn generate(&self, prompt: &str, stop: &[String]) -> Result<String, LanguageModelError>;
}
