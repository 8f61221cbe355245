//! Generation provider factory.
//!
//! Creates generation clients from a provider name plus the resolved
//! endpoint, credentials and timeout.

use crate::client::LlmClient;
use crate::providers::gemini::DEFAULT_GEMINI_URL;
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use policy_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout for generation calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Create a generation client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for Gemini)
/// * `timeout` - Per-request timeout; defaults to [`DEFAULT_TIMEOUT_SECS`]
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// credential is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

    match ProviderType::parse(provider) {
        Some(ProviderType::Gemini) => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("Gemini provider requires API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or(DEFAULT_GEMINI_URL);
            Ok(Arc::new(GeminiClient::with_timeout(base_url, api_key, timeout)?))
        }
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            Ok(Arc::new(OllamaClient::with_timeout(base_url, timeout)?))
        }
        None => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
