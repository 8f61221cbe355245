//! Policy-aware retrieval for the HR policy assistant.
//!
//! Loads a versioned policy corpus, retrieves documents by semantic
//! similarity, drops any whose lifecycle status the question may not see,
//! and composes an answer grounded only in what survived.
//!
//! # Example
//! ```no_run
//! use policy_core::AppConfig;
//! use policy_knowledge::PolicyPipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let pipeline = PolicyPipeline::from_config(&config).await?;
//! let outcome = pipeline.ask("How many days can I work remotely?").await?;
//! println!("{} ({})", outcome.answer.text, outcome.answer.sources.join(", "));
//! # Ok(())
//! # }
//! ```

pub mod embeddings;
pub mod index;
pub mod intent;
pub mod lifecycle;
pub mod pipeline;
pub mod retriever;
pub mod store;
pub mod synthesizer;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::SqliteIndex;
pub use intent::{IntentClassifier, DEFAULT_KEYWORDS};
pub use lifecycle::filter;
pub use pipeline::{answer_question, PolicyPipeline, QueryOutcome};
pub use retriever::Retriever;
pub use store::{CorpusManifest, DocumentSpec, DocumentStore};
pub use synthesizer::{AnswerSynthesizer, NO_MATCH_ANSWER};
pub use types::{
    AnswerResult, DocumentMetadata, LifecycleStatus, PolicyDocument, RetrievedMatch,
    VisibilityMode,
};
pub use vector_index::{IndexEntry, VectorIndex};
