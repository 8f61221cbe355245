//! Prompt system for the policy assistant.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions with a built-in grounded-answer default
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    grounded_answer_prompt, load_grounded_answer_prompt, load_prompt, GROUNDED_ANSWER_PROMPT_ID,
    GROUNDING_RULES,
};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptInputSpec};
