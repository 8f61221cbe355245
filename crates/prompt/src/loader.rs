//! Prompt loader for YAML prompt definitions and the built-in defaults.

use crate::types::{PromptBehavior, PromptDefinition, PromptInputSpec};
use policy_core::config::POLICY_DIR;
use policy_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Identifier of the grounded-answer prompt.
pub const GROUNDED_ANSWER_PROMPT_ID: &str = "policy.answer.grounded";

/// Grounding rules sent as the system instruction of every answer request,
/// ahead of any system text a prompt definition adds.
pub const GROUNDING_RULES: &str = "You are an HR policy assistant.
- Base your answer only on the provided policy context. If the context does not answer the question, say so.
- If draft policy is mentioned, clearly say it is not yet effective.";

const GROUNDED_ANSWER_TEMPLATE: &str = "You are an HR policy assistant.

Context:
{{context}}

Question: {{question}}

Rules:
- Base your answer only on the context. If the context does not answer the question, say so.
- If draft policy is mentioned, clearly say it is not yet effective.
- Answer clearly and concisely.
";

/// The built-in grounded-answer prompt.
pub fn grounded_answer_prompt() -> PromptDefinition {
    PromptDefinition {
        id: GROUNDED_ANSWER_PROMPT_ID.to_string(),
        title: "Grounded HR policy answer".to_string(),
        api_version: "1.0".to_string(),
        created_by: "builtin".to_string(),
        behavior: PromptBehavior {
            tone: "neutral".to_string(),
            style: "concise".to_string(),
        },
        input: PromptInputSpec {
            variables: vec!["context".to_string(), "question".to_string()],
        },
        system: None,
        template: GROUNDED_ANSWER_TEMPLATE.to_string(),
    }
}

/// Path of the override file for a prompt id.
pub fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(POLICY_DIR)
        .join("prompts")
        .join(format!("{}.yml", prompt_id))
}

/// Load a prompt definition by ID from `.policy/prompts/<id>.yml`.
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load the grounded-answer prompt, preferring a workspace override.
///
/// An override that exists but is invalid is an error; it is never silently
/// replaced by the built-in.
pub fn load_grounded_answer_prompt(workspace_path: &Path) -> AppResult<PromptDefinition> {
    if prompt_path(workspace_path, GROUNDED_ANSWER_PROMPT_ID).exists() {
        let definition = load_prompt(workspace_path, GROUNDED_ANSWER_PROMPT_ID)?;
        for required in ["context", "question"] {
            if !definition.input.variables.iter().any(|v| v == required) {
                return Err(AppError::Prompt(format!(
                    "Prompt '{}' must declare input variable '{}'",
                    definition.id, required
                )));
            }
        }
        return Ok(definition);
    }

    tracing::debug!("Using built-in prompt {}", GROUNDED_ANSWER_PROMPT_ID);
    Ok(grounded_answer_prompt())
}

/// Validate a prompt definition.
pub fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    let compact: String = def.template.chars().filter(|c| !c.is_whitespace()).collect();
    for name in &def.input.variables {
        if !compact.contains(&format!("{{{{{}}}}}", name)) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' declares variable '{}' but its template never uses it",
                def.id, name
            )));
        }
    }

    Ok(())
}
