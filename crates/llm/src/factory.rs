//! LLM provider factory.
//!
//! Creates LLM clients from configuration: resolves the provider name,
//! checks the credential and applies endpoint and timeout settings.

use crate::client::LlmClient;
use crate::providers::{gemini::DEFAULT_GEMINI_URL, GeminiClient};
use crate::types::ProviderType;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (for providers that require it)
/// * `timeout` - Request timeout
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required key
/// is missing, `AppError::Llm` if the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::Gemini => {
            let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                AppError::Config("Gemini provider requires API key".to_string())
            })?;
            let base_url = endpoint.unwrap_or(DEFAULT_GEMINI_URL);
            let client = GeminiClient::with_config(api_key, base_url, timeout)?;
            tracing::debug!("Created Gemini client for {}", base_url);
            Ok(Arc::new(client))
        }
    }
}
