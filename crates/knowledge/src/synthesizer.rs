//! Answer synthesizer: grounded prompt construction and a single generation call.

use crate::types::{AnswerResult, RetrievedMatch};
use policy_core::{AppError, AppResult};
use policy_llm::{LlmClient, LlmRequest};
use policy_prompt::{build_prompt, grounded_answer_prompt, PromptDefinition, GROUNDING_RULES};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Answer returned when no document survives the lifecycle filter.
pub const NO_MATCH_ANSWER: &str = "No relevant policy found.";

/// Separator placed between document contents in the prompt context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Generation is deterministic.
const TEMPERATURE: f32 = 0.0;

/// Builds a grounded prompt from filtered matches and asks the LLM once.
pub struct AnswerSynthesizer {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl std::fmt::Debug for AnswerSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerSynthesizer")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("prompt", &self.prompt.id)
            .finish()
    }
}

impl AnswerSynthesizer {
    /// Create a synthesizer using the built-in grounded prompt.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            prompt: grounded_answer_prompt(),
        }
    }

    /// Replace the prompt definition (e.g. a workspace override).
    ///
    /// The grounding rules stay in the system instruction whatever the
    /// override's template says.
    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Contents in filter order, separated by a blank line.
    pub fn build_context(matches: &[RetrievedMatch]) -> String {
        matches
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Distinct sources in first-occurrence order.
    pub fn collect_sources(matches: &[RetrievedMatch]) -> Vec<String> {
        let mut seen = HashSet::new();
        matches
            .iter()
            .filter(|m| seen.insert(m.source()))
            .map(|m| m.source().to_string())
            .collect()
    }

    /// Answer `question` from `filtered` only.
    ///
    /// An empty `filtered` returns `NO_MATCH_ANSWER` without calling the LLM.
    ///
    /// # Errors
    /// `AppError::GenerationUnavailable` if the LLM call fails; a canned
    /// answer is never substituted.
    pub async fn synthesize(
        &self,
        question: &str,
        filtered: &[RetrievedMatch],
    ) -> AppResult<AnswerResult> {
        if filtered.is_empty() {
            tracing::info!("No documents passed the filter; skipping generation");
            return Ok(AnswerResult {
                text: NO_MATCH_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), Self::build_context(filtered));
        variables.insert("question".to_string(), question.to_string());
        let built = build_prompt(&self.prompt, variables)?;

        let system = match built.system {
            Some(extra) if !extra.trim().is_empty() => format!("{}\n\n{}", GROUNDING_RULES, extra),
            _ => GROUNDING_RULES.to_string(),
        };
        let request = LlmRequest::new(built.user, self.model.clone())
            .with_temperature(TEMPERATURE)
            .with_system(system);

        tracing::info!(
            provider = self.client.provider_name(),
            model = %self.model,
            documents = filtered.len(),
            "Requesting grounded answer"
        );

        let response = self.client.complete(&request).await.map_err(|e| match e {
            AppError::GenerationUnavailable(_) => e,
            other => AppError::GenerationUnavailable(other.to_string()),
        })?;

        tracing::debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Generation usage"
        );

        Ok(AnswerResult {
            text: response.content,
            sources: Self::collect_sources(filtered),
        })
    }
}
