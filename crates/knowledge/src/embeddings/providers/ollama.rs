//! Ollama embedding provider.
//!
//! Calls Ollama's local `/api/embeddings` endpoint, one request per text.
//! Failures are reported immediately as `RetrievalUnavailable`; there is no
//! retry loop, and the per-request timeout is owned by the HTTP client.

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use policy_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    config: EmbeddingConfig,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider from configuration. No request is made until the
    /// first embedding.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::RetrievalUnavailable(format!(
                "Failed to create HTTP client for Ollama: {}",
                e
            ))
        })?;

        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            config: config.clone(),
        })
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.config.model))]
    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.config.model,
            prompt: text,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "failed" };
                AppError::RetrievalUnavailable(format!(
                    "Embedding request to Ollama at {} {}: {}",
                    self.base_url, reason, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(AppError::RetrievalUnavailable(format!(
                "Ollama embeddings API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::RetrievalUnavailable(format!("Failed to parse Ollama response: {}", e))
        })?;

        self.config.check_dimensions(&body.embedding)?;
        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.config.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        // Ollama's embeddings endpoint takes one prompt per request
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_single(text).await?);
        }
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: Option<&str>) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            endpoint: endpoint.map(str::to_string),
            timeout_secs: Some(2),
        }
    }

    #[test]
    fn test_default_base_url() {
        let provider = OllamaProvider::new(&config(None)).unwrap();
        assert_eq!(provider.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = OllamaProvider::new(&config(Some("http://gpu-box:11434/"))).unwrap();
        assert_eq!(provider.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn test_request_serialization() {
        let request = EmbeddingRequest {
            model: "all-minilm",
            prompt: "remote work",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "all-minilm");
        assert_eq!(json["prompt"], "remote work");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_retrieval_unavailable() {
        let provider = OllamaProvider::new(&config(Some("http://127.0.0.1:9"))).unwrap();
        let err = provider.embed("remote work").await.unwrap_err();
        assert!(matches!(err, AppError::RetrievalUnavailable(_)));
    }

    /// Serve a single canned JSON response on a local port.
    async fn serve_once(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_wrong_dimensions_rejected() {
        let url = serve_once(r#"{"embedding":[0.1,0.2,0.3]}"#).await;
        let provider = OllamaProvider::new(&config(Some(&url))).unwrap();

        let err = provider.embed("remote work").await.unwrap_err();
        assert!(matches!(err, AppError::RetrievalUnavailable(_)));
        assert!(err.to_string().contains("returned 3 dimensions, expected 384"));
    }
}
