//! Vector index abstraction for policy documents.
//!
//! Defines a trait for backend-agnostic vector storage and retrieval.

use crate::types::{DocumentMetadata, RetrievedMatch};
use policy_core::AppResult;

/// One document to be indexed.
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry<'a> {
    pub id: &'a str,
    pub embedding: &'a [f32],
    pub metadata: &'a DocumentMetadata,
    pub content: &'a str,
}

/// Trait for vector index backends.
///
/// Mutating operations take `&mut self` so they can never overlap a search.
pub trait VectorIndex: Send + Sync {
    /// Replace the whole index content with `entries`, in order.
    ///
    /// Either every entry is stored or the index is left exactly as it was.
    fn replace_all(&mut self, entries: &[IndexEntry<'_>]) -> AppResult<()>;

    /// Search for the top-k most similar documents to the query embedding.
    ///
    /// Returns matches ordered by descending similarity; ties keep insertion
    /// order.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<RetrievedMatch>>;

    /// Number of indexed documents.
    fn len(&self) -> AppResult<usize>;

    /// Whether the index holds no documents.
    fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }
}
