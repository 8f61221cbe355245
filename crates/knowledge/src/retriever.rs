//! Retriever: embeds the corpus once and answers top-k similarity queries.

use crate::embeddings::EmbeddingProvider;
use crate::types::{PolicyDocument, RetrievedMatch};
use crate::vector_index::{IndexEntry, VectorIndex};
use policy_core::{AppError, AppResult};
use std::sync::Arc;

/// Semantic retriever over the policy corpus.
///
/// The same embedding provider is used for documents and queries.
pub struct Retriever {
    provider: Arc<dyn EmbeddingProvider>,
    index: Box<dyn VectorIndex>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_name())
            .finish_non_exhaustive()
    }
}

impl Retriever {
    /// Embed and index `documents`, returning a ready retriever.
    pub async fn build(
        provider: Arc<dyn EmbeddingProvider>,
        index: Box<dyn VectorIndex>,
        documents: &[PolicyDocument],
    ) -> AppResult<Self> {
        let mut retriever = Self { provider, index };
        retriever.rebuild(documents).await?;
        Ok(retriever)
    }

    /// Replace the indexed corpus with `documents`.
    ///
    /// All embeddings are computed before the index is touched and the swap
    /// is atomic, so any failure leaves the previous corpus searchable.
    pub async fn rebuild(&mut self, documents: &[PolicyDocument]) -> AppResult<()> {
        let texts: Vec<String> = documents.iter().map(|d| d.content().to_string()).collect();

        tracing::info!(
            "Embedding {} documents using provider '{}' (model: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );

        let embeddings = self.provider.embed_batch(&texts).await.map_err(as_retrieval)?;
        if embeddings.len() != documents.len() {
            return Err(AppError::RetrievalUnavailable(format!(
                "Embedding provider returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let entries: Vec<IndexEntry<'_>> = documents
            .iter()
            .zip(&embeddings)
            .map(|(document, embedding)| IndexEntry {
                id: document.id(),
                embedding,
                metadata: document.metadata(),
                content: document.content(),
            })
            .collect();
        self.index.replace_all(&entries)?;

        tracing::info!("Indexed {} policy documents", documents.len());
        Ok(())
    }

    /// Return up to `k` documents most similar to `query`, most similar first.
    ///
    /// # Errors
    /// `AppError::Config` if `k == 0`; `AppError::RetrievalUnavailable` if
    /// embedding or the index fails.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<Vec<RetrievedMatch>> {
        if k == 0 {
            return Err(AppError::Config(
                "top-k must be at least 1".to_string(),
            ));
        }

        let query_embedding = self.provider.embed(query).await.map_err(as_retrieval)?;
        let matches = self.index.search(&query_embedding, k).map_err(as_retrieval)?;

        for m in &matches {
            tracing::debug!(
                source = %m.source(),
                status = %m.status(),
                score = m.score,
                "Retrieved"
            );
        }
        tracing::info!("Retrieved {} documents (top-{})", matches.len(), k);

        Ok(matches)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> AppResult<usize> {
        self.index.len()
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        self.index.is_empty()
    }
}

fn as_retrieval(err: AppError) -> AppError {
    match err {
        AppError::RetrievalUnavailable(_) => err,
        other => AppError::RetrievalUnavailable(other.to_string()),
    }
}
