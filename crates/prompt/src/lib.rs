//! Prompt assembly for DocQA.
//!
//! Renders the extraction prompt that constrains the language model to the
//! retrieved context. The template is fixed; the only inputs are the joined
//! context and the user's question.

pub mod builder;

// Re-export main items
pub use builder::{build_extraction_prompt, join_context, EXTRACTION_TEMPLATE, NOT_FOUND_ANSWER};
