//! Embedding configuration types.

use policy_core::config::RetrievalConfig;
use policy_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding configuration for the policy corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram", "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// HTTP endpoint for remote providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds for remote providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            timeout_secs: None,
        }
    }
}

impl EmbeddingConfig {
    /// Derive the embedding settings from the retrieval section of `AppConfig`.
    pub fn from_retrieval(retrieval: &RetrievalConfig) -> Self {
        Self {
            provider: retrieval.embedding_provider.clone(),
            model: retrieval.embedding_model.clone(),
            dimensions: retrieval.embedding_dimensions,
            endpoint: retrieval.embedding_endpoint.clone(),
            timeout_secs: None,
        }
    }

    /// Check that a vector produced by this provider has the configured size.
    pub fn check_dimensions(&self, embedding: &[f32]) -> AppResult<()> {
        if embedding.len() != self.dimensions {
            return Err(AppError::RetrievalUnavailable(format!(
                "Dimension mismatch: model '{}' returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}
