//! Concrete language-model providers.

pub mod gemini;

pub use gemini::GeminiClient;
