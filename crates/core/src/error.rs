//! Error types for DocQA.
//!
//! One error enum covers configuration, I/O, language-model, knowledge base,
//! prompt and document extraction failures.

use thiserror::Error;

/// Unified error type for DocQA.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base, index and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The uploaded file is neither PDF nor DOCX
    #[error("Unsupported file type '{0}'. Please upload PDF or DOCX.")]
    UnsupportedFormat(String),

    /// Extraction succeeded but produced no words
    #[error("No text extracted from document. Please upload a text-based PDF or DOCX (not scanned).")]
    EmptyExtraction,

    /// The extractor failed to read the document
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
