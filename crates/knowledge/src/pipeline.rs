//! Query pipeline: classify, retrieve, filter, synthesize.

use crate::embeddings::{create_provider, EmbeddingConfig};
use crate::index::SqliteIndex;
use crate::intent::IntentClassifier;
use crate::lifecycle;
use crate::retriever::Retriever;
use crate::store::{CorpusManifest, DocumentStore};
use crate::synthesizer::AnswerSynthesizer;
use crate::types::{AnswerResult, RetrievedMatch, VisibilityMode};
use policy_core::{AppConfig, AppResult};
use policy_llm::create_client;
use policy_prompt::load_grounded_answer_prompt;
use serde::Serialize;
use std::time::Duration;

/// Everything one query produced, for callers that want to show their work.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub mode: VisibilityMode,
    pub retrieved: Vec<RetrievedMatch>,
    pub filtered: Vec<RetrievedMatch>,
    pub answer: AnswerResult,
}

/// Run one question through the stages in order.
///
/// Classification does not depend on retrieval; both run before filtering.
pub async fn answer_question(
    retriever: &Retriever,
    classifier: &IntentClassifier,
    synthesizer: &AnswerSynthesizer,
    question: &str,
    top_k: usize,
) -> AppResult<QueryOutcome> {
    let mode = classifier.classify(question);
    let retrieved = retriever.search(question, top_k).await?;
    let filtered = lifecycle::filter(retrieved.iter().cloned(), mode);
    let answer = synthesizer.synthesize(question, &filtered).await?;

    Ok(QueryOutcome {
        mode,
        retrieved,
        filtered,
        answer,
    })
}

/// A fully assembled pipeline over a loaded corpus.
#[derive(Debug)]
pub struct PolicyPipeline {
    retriever: Retriever,
    classifier: IntentClassifier,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
}

impl PolicyPipeline {
    pub fn new(
        retriever: Retriever,
        classifier: IntentClassifier,
        synthesizer: AnswerSynthesizer,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            classifier,
            synthesizer,
            top_k,
        }
    }

    /// Assemble the pipeline from configuration: load the corpus, embed and
    /// index it, and create the generation client.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let manifest = CorpusManifest::load_or_reference(&config.corpus_manifest_path())?;
        let documents = DocumentStore::new(config.workspace.clone(), manifest).load()?;

        let embedding_config = EmbeddingConfig::from_retrieval(&config.retrieval);
        let provider = create_provider(&embedding_config)?;
        let index = match config.index_path() {
            Some(path) => SqliteIndex::open(&path)?,
            None => SqliteIndex::in_memory()?,
        };
        let retriever = Retriever::build(provider, Box::new(index), &documents).await?;

        let provider_name = config.provider.as_str();
        let endpoint = config.resolve_endpoint(provider_name);
        let api_key = config.resolve_api_key(provider_name);
        let timeout = config.resolve_timeout(provider_name).map(Duration::from_secs);
        let client = create_client(provider_name, endpoint.as_deref(), api_key.as_deref(), timeout)?;

        let prompt = load_grounded_answer_prompt(&config.workspace)?;
        let synthesizer = AnswerSynthesizer::new(client, config.model.clone()).with_prompt(prompt);

        tracing::debug!(
            provider = provider_name,
            model = %config.model,
            top_k = config.retrieval.top_k,
            "Pipeline ready"
        );

        Ok(Self::new(
            retriever,
            IntentClassifier::from_config(&config.intent),
            synthesizer,
            config.retrieval.top_k,
        ))
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer with the configured top-k.
    pub async fn ask(&self, question: &str) -> AppResult<QueryOutcome> {
        self.ask_with_top_k(question, self.top_k).await
    }

    pub async fn ask_with_top_k(&self, question: &str, top_k: usize) -> AppResult<QueryOutcome> {
        answer_question(
            &self.retriever,
            &self.classifier,
            &self.synthesizer,
            question,
            top_k,
        )
        .await
    }
}
