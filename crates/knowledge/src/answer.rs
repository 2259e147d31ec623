//! Answer generation from retrieved context.
//!
//! With a language-model credential the extraction prompt is sent to the
//! configured client. Without one, the retrieved context itself is the answer.

use docqa_core::{AppConfig, AppError, AppResult};
use docqa_llm::{create_client, LlmClient, LlmRequest, ProviderType};
use docqa_prompt::{build_extraction_prompt, join_context};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// No document has been indexed yet
    NoDocument,

    /// Model reply, trimmed
    Generated(String),

    /// The model replied with nothing
    NoAnswer,

    /// Retrieved context returned as-is (no credential configured)
    Context(String),

    /// The language-model call failed
    Failed { provider: String, message: String },
}

impl Answer {
    pub const NO_DOCUMENT_MESSAGE: &'static str =
        "No indexed document found. Please upload a document first.";
    pub const NO_ANSWER_MESSAGE: &'static str = "No answer found.";

    /// Single-string rendering shown to users.
    pub fn render(&self) -> String {
        match self {
            Self::NoDocument => Self::NO_DOCUMENT_MESSAGE.to_string(),
            Self::Generated(text) => text.clone(),
            Self::NoAnswer => Self::NO_ANSWER_MESSAGE.to_string(),
            Self::Context(context) => context.clone(),
            Self::Failed { provider, message } => format!("{} error: {}", provider, message),
        }
    }

    /// Short machine-readable status.
    pub fn status(&self) -> &'static str {
        match self {
            Self::NoDocument => "no_document",
            Self::Generated(_) => "generated",
            Self::NoAnswer => "no_answer",
            Self::Context(_) => "context",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

enum Mode {
    Llm {
        client: Arc<dyn LlmClient>,
        model: String,
    },
    ContextOnly,
}

/// Produces an [`Answer`] from retrieved chunks and the query.
pub struct AnswerGenerator {
    mode: Mode,
}

impl AnswerGenerator {
    /// Submit prompts through `client` using `model`.
    pub fn with_client(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            mode: Mode::Llm {
                client,
                model: model.into(),
            },
        }
    }

    /// Return the retrieved context instead of calling a model.
    pub fn context_only() -> Self {
        Self {
            mode: Mode::ContextOnly,
        }
    }

    /// Choose the mode from configuration: LLM mode iff a credential is set.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        if !config.has_credential() {
            tracing::info!("No language-model credential configured; answers will be raw context");
            return Ok(Self::context_only());
        }

        let client = create_client(
            &config.provider,
            config.llm_endpoint.as_deref(),
            config.api_key.as_deref(),
            Duration::from_secs(config.llm_timeout_secs),
        )?;

        tracing::info!(
            "Using {} model '{}' for answers",
            client.provider_name(),
            config.model
        );

        Ok(Self::with_client(client, config.model.clone()))
    }

    pub fn uses_llm(&self) -> bool {
        matches!(self.mode, Mode::Llm { .. })
    }

    /// Answer `query` from `chunks` (nearest first).
    ///
    /// Model failures become [`Answer::Failed`]; only prompt rendering errors
    /// are returned as `Err`.
    pub async fn answer(&self, chunks: &[String], query: &str) -> AppResult<Answer> {
        let context = join_context(chunks);

        let (client, model) = match &self.mode {
            Mode::ContextOnly => return Ok(Answer::Context(context)),
            Mode::Llm { client, model } => (client, model),
        };

        let prompt = build_extraction_prompt(&context, query)?;
        let request = LlmRequest::new(prompt, model.as_str());

        match client.complete(&request).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.is_empty() {
                    tracing::info!("Model returned an empty reply");
                    Ok(Answer::NoAnswer)
                } else {
                    Ok(Answer::Generated(text.to_string()))
                }
            }
            Err(e) => {
                tracing::warn!("Answer generation failed: {}", e);
                let provider = ProviderType::parse(client.provider_name())
                    .map(|p| p.display_name().to_string())
                    .unwrap_or_else(|| client.provider_name().to_string());
                let message = match e {
                    AppError::Llm(message) => message,
                    other => other.to_string(),
                };
                Ok(Answer::Failed { provider, message })
            }
        }
    }
}

impl std::fmt::Debug for AnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match &self.mode {
            Mode::Llm { client, model } => format!("llm({}/{})", client.provider_name(), model),
            Mode::ContextOnly => "context_only".to_string(),
        };
        f.debug_struct("AnswerGenerator").field("mode", &mode).finish()
    }
}
