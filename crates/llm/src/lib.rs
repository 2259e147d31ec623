//! Language-model integration crate for DocQA.
//!
//! Provides a provider-agnostic abstraction over text-generation models. The
//! answer generator only sees the `LlmClient` trait; concrete providers are
//! selected by the factory.
//!
//! # Providers
//! - **Gemini**: Google Generative Language REST API (default)
//!
//! # Example
//! ```no_run
//! use docqa_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = LlmRequest::new("Hello, world!", "gemini-2.5-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::GeminiClient;
pub use types::ProviderType;
