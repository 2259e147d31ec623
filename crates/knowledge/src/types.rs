//! Knowledge system type definitions.

use crate::extract::DocumentFormat;
use serde::{Deserialize, Serialize};

/// Statistics from an ingest operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// File name the document was uploaded under
    pub file_name: String,

    /// Detected document format
    pub format: DocumentFormat,

    /// Number of chunks indexed
    pub chunks: usize,

    /// Embedding vector dimension
    pub dimensions: usize,

    /// Time taken in seconds
    pub duration_secs: f64,
}

impl IngestReport {
    /// Acknowledgment shown after a successful ingestion.
    pub const MESSAGE: &'static str = "Document processed and indexed successfully.";
}

/// Current state of the knowledge store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStatus {
    /// Whether a document is indexed
    pub has_index: bool,

    /// Number of indexed chunks (0 when absent)
    pub chunks: usize,

    /// Embedding dimension of the index, if any
    pub dimensions: Option<usize>,
}
