//! Extraction prompt builder.

use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Literal reply the model is told to use when the context lacks the answer.
pub const NOT_FOUND_ANSWER: &str = "Not found in document.";

/// Separator placed between retrieved chunks in the context block.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Fixed extraction template.
///
/// Variables: `context`, `query`, `not_found`.
pub const EXTRACTION_TEMPLATE: &str = "\
You are an information extraction assistant.
Rules:
- Use ONLY the information from the context.
- Do NOT copy the entire context.
- Extract ONLY what is explicitly asked in the question.
- If multiple items are asked (like skills, projects), return them as a short comma-separated list.
- If the answer is not in the context, reply: '{{not_found}}'

Context:
{{context}}

Question:
{{query}}

Answer:
";

/// Join retrieved chunk texts, nearest first, into one context block.
pub fn join_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Build the extraction prompt for a question over the given context.
///
/// Pure function of `(context, query)`.
///
/// # Example
/// ```
/// use docqa_prompt::build_extraction_prompt;
///
/// let prompt = build_extraction_prompt("Skills: Rust, SQL", "What skills?").unwrap();
/// assert!(prompt.contains("Skills: Rust, SQL"));
/// assert!(prompt.trim_end().ends_with("Answer:"));
/// ```
pub fn build_extraction_prompt(context: &str, query: &str) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());
    variables.insert("query".to_string(), query.to_string());
    variables.insert("not_found".to_string(), NOT_FOUND_ANSWER.to_string());

    let rendered = render_template(EXTRACTION_TEMPLATE, &variables)?;

    tracing::debug!(
        "Built extraction prompt ({} chars, {} context chars)",
        rendered.len(),
        context.len()
    );

    Ok(rendered)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

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

    #[test]
    fn test_prompt_contains_rules() {
        let prompt = build_extraction_prompt("ctx", "q").unwrap();

        assert!(prompt.starts_with("You are an information extraction assistant."));
        assert!(prompt.contains("Use ONLY the information from the context."));
        assert!(prompt.contains("Do NOT copy the entire context."));
        assert!(prompt.contains("comma-separated list"));
        assert!(prompt.contains("reply: 'Not found in document.'"));
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let prompt = build_extraction_prompt("the context", "the question").unwrap();

        let context_at = prompt.find("Context:\nthe context").unwrap();
        let question_at = prompt.find("Question:\nthe question").unwrap();
        let answer_at = prompt.rfind("Answer:").unwrap();
        assert!(context_at < question_at);
        assert!(question_at < answer_at);
    }

    #[test]
    fn test_prompt_is_pure() {
        let a = build_extraction_prompt("same", "input").unwrap();
        let b = build_extraction_prompt("same", "input").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_special_characters_not_escaped_or_expanded() {
        let context = "<b>bold</b> & {{not a variable}}";
        let prompt = build_extraction_prompt(context, "What's \"this\"?").unwrap();

        assert!(prompt.contains(context));
        assert!(prompt.contains("What's \"this\"?"));
    }

    #[test]
    fn test_join_context() {
        assert_eq!(join_context(&["first", "second"]), "first\n\nsecond");
        assert_eq!(join_context::<&str>(&[]), "");
    }

    #[test]
    fn test_render_template_missing_variable_is_error() {
        let vars = HashMap::new();
        let result = render_template("Question: {{missing}}", &vars);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }
}
