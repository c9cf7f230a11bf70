//! nlsql providers - language model backends for query chains
//!
//! Each backend implements [`nlsql_chain::LanguageModel`], so a chain can be
//! pointed at OpenAI, an OpenAI-compatible server, or a local Ollama instance
//! without changing anything else.

pub mod config;
pub mod error;
pub mod providers;

// Re-export commonly used types
pub use config::{ProviderKind, ProviderSettings, OPENAI_API_KEY_ENV};
pub use error::ProviderError;
pub use providers::{OllamaLanguageModel, OpenAiLanguageModel};
