//! Shared fixtures: a reference corpus on disk and stub collaborators.

use crate::embeddings::providers::TrigramProvider;
use crate::embeddings::EmbeddingProvider;
use crate::index::SqliteIndex;
use crate::retriever::Retriever;
use crate::store::{CorpusManifest, DocumentStore};
use crate::types::PolicyDocument;
use policy_core::{AppError, AppResult};
use policy_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const POLICY_V1: &str = "HR Policy v1 (2020)\n\
Remote work: employees may work remotely 1 day per week.\n\
Vacation: 15 days of paid vacation per year.\n\
Meal allowance: 8 EUR per working day.";

pub const POLICY_V2: &str = "HR Policy v2 (2023)\n\
Remote work: employees may work remotely 2 days per week.\n\
Vacation: 20 days of paid vacation per year.\n\
Meal allowance: 10 EUR per working day.";

pub const POLICY_DRAFT: &str = "DRAFT HR Policy v3 (planned for 2026)\n\
Remote work: proposed increase to 3 days per week.\n\
Vacation: proposed change to 25 days of paid vacation per year.";

/// Reference corpus written under a temporary workspace.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn reference() -> Self {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("policy_v1_2020.txt"), POLICY_V1).unwrap();
        fs::write(data.join("policy_v2_2023.txt"), POLICY_V2).unwrap();
        fs::write(data.join("policy_future_DRAFT_v3.txt"), POLICY_DRAFT).unwrap();
        Self { dir }
    }

    pub fn documents(&self) -> Vec<PolicyDocument> {
        DocumentStore::new(self.dir.path(), CorpusManifest::reference())
            .load()
            .unwrap()
    }

    pub async fn retriever(&self) -> Retriever {
        Retriever::build(
            Arc::new(TrigramProvider::new(384)),
            Box::new(SqliteIndex::in_memory().unwrap()),
            &self.documents(),
        )
        .await
        .unwrap()
    }
}

/// Generation stub that records every prompt.
///
/// Replies with a fixed answer, adding a "not yet effective" note when the
/// prompt carries draft policy text.
#[derive(Debug, Default)]
pub struct RecordingLlm {
    calls: AtomicUsize,
    prompts: Mutex<Vec<LlmRequest>>,
    fail: bool,
}

impl RecordingLlm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<LlmRequest> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl LlmClient for RecordingLlm {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.clone());

        if self.fail {
            return Err(AppError::GenerationUnavailable(
                "stub generation outage".to_string(),
            ));
        }

        let mut content = "Employees may work remotely 2 days per week.".to_string();
        if request.prompt.contains("DRAFT") {
            content.push_str(" A draft proposes changes, but it is not yet effective.");
        }

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
        })
    }
}

/// Embedding stub that always fails.
#[derive(Debug)]
pub struct UnavailableEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for UnavailableEmbedder {
    fn provider_name(&self) -> &str {
        "unavailable"
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        8
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::RetrievalUnavailable(
            "stub embedding outage".to_string(),
        ))
    }
}
