//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use policy_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Every variable declared in `definition.input.variables` must be present in
/// `variables`; rendering never silently substitutes an empty string for a
/// declared input.
///
/// # Example
/// ```no_run
/// use policy_prompt::{build_prompt, grounded_answer_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "How many remote days?".to_string());
/// vars.insert("context".to_string(), "Employees may work remotely 2 days.".to_string());
///
/// let built = build_prompt(&grounded_answer_prompt(), vars)?;
/// println!("{}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    for name in &definition.input.variables {
        if !variables.contains_key(name) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' requires variable '{}'",
                definition.id, name
            )));
        }
    }

    let user = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|s| render_template(s, &variables))
        .transpose()?;

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Policy text is plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PromptBehavior, PromptInputSpec};

    fn create_test_definition(variables: &[&str], template: &str) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            behavior: PromptBehavior {
                tone: "neutral".to_string(),
                style: "concise".to_string(),
            },
            input: PromptInputSpec {
                variables: variables.iter().map(|v| v.to_string()).collect(),
            },
            system: None,
            template: template.to_string(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "Meals < $30 & taxis \"approved\"".to_string());

        let result = render_template("{{context}}", &vars).unwrap();
        assert_eq!(result, "Meals < $30 & taxis \"approved\"");
    }

    #[test]
    fn test_build_prompt_requires_declared_variables() {
        let def = create_test_definition(&["question", "context"], "{{context}} {{question}}");
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "q".to_string());

        let err = build_prompt(&def, vars).unwrap_err();
        assert!(err.to_string().contains("requires variable 'context'"));
    }

    #[test]
    fn test_build_prompt_renders_system() {
        let mut def = create_test_definition(&["question"], "Q: {{question}}");
        def.system = Some("Answer about {{question}}".to_string());
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "leave".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Q: leave");
        assert_eq!(built.system.as_deref(), Some("Answer about leave"));
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_render_template_invalid_syntax() {
        let vars = HashMap::new();
        assert!(render_template("{{#if}}", &vars).is_err());
    }
}
