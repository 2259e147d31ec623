//! Single-document knowledge base.
//!
//! Ingestion turns an uploaded PDF or DOCX into word-window chunks, embeds
//! them and stores the vectors in a flat index persisted next to the chunk
//! texts. Queries embed the question, pull the nearest chunks and hand them to
//! the answer generator.
//!
//! ```text
//! ingest: bytes -> extract -> chunk_words -> embed_batch -> FlatIndex -> KnowledgeStore::replace
//! ask:    query -> embed -> FlatIndex::search -> chunk texts -> prompt -> Answer
//! ```

pub mod answer;
pub mod chunker;
pub mod embeddings;
pub mod extract;
pub mod retriever;
pub mod service;
pub mod store;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use answer::{Answer, AnswerGenerator};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use extract::{DocumentFormat, TextExtractor};
pub use service::DocQa;
pub use store::{KnowledgeBase, KnowledgeStore};
pub use types::{IngestReport, KnowledgeStatus};
pub use vector_index::{FlatIndex, SearchHit};
