//! Provider implementations

pub mod ollama;
pub mod openai;

pub use ollama::OllamaLanguageModel;
pub use openai::OpenAiLanguageModel;

use reqwest::{header::RETRY_AFTER, Response};
use tracing::error;

use crate::error::ProviderError;

/// Seconds to wait when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Map a non-success HTTP response to a provider error
pub(crate) async fn status_error(provider: &str, response: Response) -> ProviderError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    let body = response.text().await.unwrap_or_default();
    error!("{} API error ({}): {}", provider, status, body);

    match status.as_u16() {
        401 | 403 => ProviderError::AuthError,
        429 => ProviderError::RateLimited(retry_after),
        _ => ProviderError::ProviderError(format!("{} API error: {}", provider, status)),
    }
}
