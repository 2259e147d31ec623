//! Embedding providers.
//!
//! Text is mapped to fixed-dimension vectors through the [`EmbeddingProvider`]
//! capability. Providers are chosen from [`docqa_core::EmbeddingSettings`].

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
